/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Interfaces to the sources of symmetry data and structures.

use std::path::Path;

use serde::{Serialize, Deserialize};

use isomode_array_types::{V3, mat};
use isomode_structure::{Structure, SymmetryOperation, CellTransformation};

use crate::{FailResult, Irrep, IrrepKind, KPoint, Characters};
use crate::orbits::{OrbitCorrespondence, OrbitSplit};

/// Supplies the group-theoretical data for a parent space group.
pub trait SymmetryDataProvider {
    /// Operations of the space group modulo lattice translations, in the
    /// fractional coordinates of the parent cell.
    fn operations_for(&self, space_group: u32) -> FailResult<Vec<SymmetryOperation>>;

    /// Irreps at a k-point, with characters over `operations_for`.
    fn irreps_for(&self, space_group: u32, k_point: &KPoint) -> FailResult<Vec<Irrep>>;

    /// How the parent orbits split in a subgroup.  `None` means that the
    /// split should be derived from the subgroup operations.
    fn wyckoff_correspondence(
        &self,
        _parent: u32,
        _subgroup: u32,
        _cell: &CellTransformation,
    ) -> FailResult<Option<OrbitCorrespondence>>
    { Ok(None) }
}

/// Loads structures and relates a distorted structure to its parent.
pub trait StructureAdapter {
    fn load(&self, path: &Path) -> FailResult<Structure>;

    fn cell_transformation(&self, parent: &Structure, distorted: &Structure) -> FailResult<CellTransformation>;
}

//--------------------------------------------------------------------------

/// Symmetry data for a handful of space groups, as read from a file.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct SymmetryTables {
    pub groups: Vec<GroupTable>,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct GroupTable {
    pub number: u32,
    pub operations: Vec<OperationEntry>,
    #[serde(default)]
    pub irreps: Vec<IrrepEntry>,
    #[serde(default)]
    pub correspondences: Vec<CorrespondenceTable>,
}

/// `x' = R x + t` on parent fractional coordinates (x a column vector).
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct OperationEntry {
    pub rotation: [[i32; 3]; 3],
    #[serde(default)]
    pub translation: [f64; 3],
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CharacterForm {
    /// One character per parent operation.
    Parent,
    /// One character per working group member.
    Working,
}

impl Default for CharacterForm {
    fn default() -> Self { CharacterForm::Parent }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct IrrepEntry {
    pub label: String,
    /// Label of the k-point, matched against the requested [`KPoint`].
    pub k_point: String,
    /// Overrides the vector of the requested k-point.
    #[serde(default)]
    pub k: Option<[f64; 3]>,
    pub characters: Vec<f64>,
    #[serde(default)]
    pub kind: IrrepKind,
    #[serde(default)]
    pub form: CharacterForm,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CorrespondenceTable {
    pub subgroup: u32,
    pub matrix: [[i32; 3]; 3],
    #[serde(default)]
    pub origin: [f64; 3],
    pub orbits: Vec<OrbitSplit>,
}

/// A [`SymmetryDataProvider`] backed by [`SymmetryTables`].
#[derive(Debug, Clone)]
pub struct TableProvider {
    tables: SymmetryTables,
}

impl TableProvider {
    pub fn new(tables: SymmetryTables) -> Self
    { TableProvider { tables } }

    fn group(&self, space_group: u32) -> FailResult<&GroupTable>
    {
        self.tables.groups.iter()
            .find(|g| g.number == space_group)
            .ok_or_else(|| format_err!("no symmetry data for space group {}", space_group))
    }
}

impl SymmetryDataProvider for TableProvider {
    fn operations_for(&self, space_group: u32) -> FailResult<Vec<SymmetryOperation>>
    {
        self.group(space_group)?.operations.iter().enumerate()
            .map(|(i, entry)| {
                SymmetryOperation::new(&mat::from_array(entry.rotation), V3(entry.translation))
                    .map_err(|e| format_err!("space group {}, operation {}: {}", space_group, i, e))
            })
            .collect()
    }

    fn irreps_for(&self, space_group: u32, k_point: &KPoint) -> FailResult<Vec<Irrep>>
    {Ok({
        let irreps: Vec<Irrep> = self.group(space_group)?.irreps.iter()
            .filter(|entry| entry.k_point == k_point.label)
            .map(|entry| Irrep {
                label: entry.label.clone(),
                kind: entry.kind,
                characters: match entry.form {
                    CharacterForm::Parent => Characters::KVector {
                        k: V3(entry.k.unwrap_or(k_point.vector)),
                        parent: entry.characters.clone(),
                    },
                    CharacterForm::Working => Characters::Working(entry.characters.clone()),
                },
            })
            .collect();
        ensure!(!irreps.is_empty(), "space group {}: no irreps at k-point {}", space_group, k_point.label);
        irreps
    })}

    fn wyckoff_correspondence(
        &self,
        parent: u32,
        subgroup: u32,
        cell: &CellTransformation,
    ) -> FailResult<Option<OrbitCorrespondence>>
    {Ok({
        let matrix = (*cell.matrix()).into_array();
        let origin = cell.origin();
        self.group(parent)?.correspondences.iter()
            .find(|c| {
                c.subgroup == subgroup
                    && c.matrix == matrix
                    && (0..3).all(|k| (c.origin[k] - origin[k]).abs() < 1e-6)
            })
            .map(|c| OrbitCorrespondence { orbits: c.orbits.clone() })
    })}
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    const TABLES: &str = "
groups:
  - number: 10
    operations:
      - rotation: [[1, 0, 0], [0, 1, 0], [0, 0, 1]]
      - rotation: [[-1, 0, 0], [0, 1, 0], [0, 0, -1]]
      - rotation: [[-1, 0, 0], [0, -1, 0], [0, 0, -1]]
      - rotation: [[1, 0, 0], [0, -1, 0], [0, 0, 1]]
    irreps:
      - { label: GM1+, k-point: GM, characters: [1, 1, 1, 1] }
      - { label: GM2-, k-point: GM, characters: [1, 1, -1, -1] }
      - { label: Y1+, k-point: Y, k: [0, 0.5, 0], characters: [1, 1, 1, 1] }
    correspondences:
      - subgroup: 6
        matrix: [[1, 0, 0], [0, 1, 0], [0, 0, 1]]
        orbits:
          - parent: Ti1
            suborbits: [[0]]
";

    fn provider() -> TableProvider
    { TableProvider::new(serde_yaml::from_str(TABLES).unwrap()) }

    #[test]
    fn operations_and_irreps_are_read() {
        let provider = provider();
        let ops = provider.operations_for(10).unwrap();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[1].rot(), mat::from_array([[-1, 0, 0], [0, 1, 0], [0, 0, -1]]));

        let gamma = provider.irreps_for(10, &KPoint::gamma()).unwrap();
        assert_eq!(gamma.iter().map(|i| i.label()).collect::<Vec<_>>(), vec!["GM1+", "GM2-"]);

        let y = provider.irreps_for(10, &KPoint::new("Y", [0.0; 3])).unwrap();
        match y[0].characters {
            Characters::KVector { k, .. } => assert_eq!(k, V3([0.0, 0.5, 0.0])),
            ref other => panic!("unexpected: {:?}", other),
        }

        assert!(provider.irreps_for(10, &KPoint::new("Z", [0.0, 0.0, 0.5])).is_err());
        assert!(provider.operations_for(11).is_err());
    }

    #[test]
    fn correspondence_is_matched_by_cell() {
        let provider = provider();
        let identity = CellTransformation::identity();
        let found = provider.wyckoff_correspondence(10, 6, &identity).unwrap().unwrap();
        assert_eq!(found.orbits[0].parent.as_str(), "Ti1");

        let doubled = CellTransformation::diagonal([2, 1, 1]).unwrap();
        assert_eq!(provider.wyckoff_correspondence(10, 6, &doubled).unwrap(), None);
    }
}
