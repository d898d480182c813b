/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::f64::consts::PI;

use isomode_array_types::{V3, M33};
use isomode_structure::{SymmetryOperation, CellTransformation, CayleyTable, Tol};

use crate::{FailResult, Irrep, Characters, DataInconsistency};

/// The parent space group acting on a working cell.
///
/// Members are the parent operations combined with the parent lattice
/// translations that are distinct modulo the working lattice, expressed in
/// working-cell fractional coordinates.  Member `t * n_parent + i` is parent
/// operation `i` followed by coset translation `t`, so the first `n_parent`
/// members are the parent operations themselves.
#[derive(Debug, Clone)]
pub struct WorkingGroup {
    space_group: u32,
    cell: CellTransformation,
    parent_rots: Vec<M33<i32>>,
    translations: Vec<V3<i32>>,
    ops: Vec<SymmetryOperation>,
    table: CayleyTable,
}

impl WorkingGroup {
    pub fn new(
        space_group: u32,
        parent_ops: &[SymmetryOperation],
        cell: &CellTransformation,
        symmetry_tol: f64,
    ) -> FailResult<WorkingGroup>
    {Ok({
        // validate the parent group first, so that errors point at parent indices
        CayleyTable::of_operations(parent_ops, symmetry_tol)
            .map_err(|cause| DataInconsistency::NotAGroup { space_group, cause })?;

        let translations = cell.coset_translations();
        let mut ops = Vec::with_capacity(translations.len() * parent_ops.len());
        for t in &translations {
            for (i, op) in parent_ops.iter().enumerate() {
                let op = cell.transform_operation(op, *t, symmetry_tol)
                    .map_err(|_| DataInconsistency::CellNotInvariant { space_group, operation: i })?;
                ops.push(op);
            }
        }

        let table = CayleyTable::of_operations(&ops, symmetry_tol)
            .map_err(|cause| DataInconsistency::NotAGroup { space_group, cause })?;

        debug!("space group {}: working group of order {} ({} x {})",
            space_group, ops.len(), parent_ops.len(), translations.len());

        WorkingGroup {
            space_group,
            cell: cell.clone(),
            parent_rots: parent_ops.iter().map(|op| op.rot()).collect(),
            translations,
            ops,
            table,
        }
    })}

    pub fn space_group(&self) -> u32 { self.space_group }
    pub fn cell(&self) -> &CellTransformation { &self.cell }
    pub fn len(&self) -> usize { self.ops.len() }
    pub fn operations(&self) -> &[SymmetryOperation] { &self.ops }
    pub fn table(&self) -> &CayleyTable { &self.table }
    pub fn num_parent_operations(&self) -> usize { self.parent_rots.len() }

    /// Index of the parent operation underlying a member.
    pub fn parent_index(&self, member: usize) -> usize
    { member % self.parent_rots.len() }

    /// Coset translation (parent fractional units) underlying a member.
    pub fn translation(&self, member: usize) -> V3<i32>
    { self.translations[member / self.parent_rots.len()] }

    /// Find a working-cell operation among the members.
    pub fn locate(&self, op: &SymmetryOperation, tol: f64) -> Option<usize>
    { self.ops.iter().position(|member| member.approx_eq(op, tol)) }

    /// Character of every member in an irrep.
    pub fn characters(&self, irrep: &Irrep) -> Result<Vec<f64>, DataInconsistency>
    {
        let space_group = self.space_group;
        let count_error = |found| DataInconsistency::CharacterCount {
            space_group, found,
            irrep: irrep.label.clone(),
            expected: match irrep.characters {
                Characters::Working(_) => self.len(),
                Characters::KVector { .. } => self.num_parent_operations(),
            },
        };

        match irrep.characters {
            Characters::Working(ref chars) => {
                if chars.len() != self.len() {
                    return Err(count_error(chars.len()));
                }
                Ok(chars.clone())
            },
            Characters::KVector { k, ref parent } => {
                if parent.len() != self.num_parent_operations() {
                    return Err(count_error(parent.len()));
                }

                // single arm: k R ≡ k for every rotation
                for (operation, rot) in self.parent_rots.iter().enumerate() {
                    let moved = k * &rot.map(f64::from) - k;
                    if !Tol(1e-6).is_integral_v3(&moved) {
                        return Err(DataInconsistency::MultiArmStar {
                            space_group, operation,
                            irrep: irrep.label.clone(),
                        });
                    }
                }

                // the working lattice vectors must be translations with phase 1
                let matrix = self.cell.matrix().map(f64::from);
                for row in &matrix.0 {
                    if Tol(1e-6).unfloat(k.dot(row)).is_err() {
                        return Err(DataInconsistency::IncommensurateK {
                            space_group,
                            irrep: irrep.label.clone(),
                            cell: (*self.cell.matrix()).into_array(),
                        });
                    }
                }

                let mut phases = Vec::with_capacity(self.translations.len());
                for t in &self.translations {
                    let arg = 2.0 * PI * k.dot(&t.map(f64::from));
                    if arg.sin().abs() > 1e-6 {
                        return Err(DataInconsistency::ComplexPhase {
                            space_group,
                            irrep: irrep.label.clone(),
                            translation: t.0,
                        });
                    }
                    phases.push(arg.cos().round());
                }

                Ok((0..self.len()).map(|m| {
                    phases[m / parent.len()] * parent[self.parent_index(m)]
                }).collect())
            },
        }
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use isomode_array_types::mat;
    use crate::test_util::{mmm_operations, mmm_irreps};

    #[test]
    fn order_is_parent_order_times_volume() {
        let cell = CellTransformation::diagonal([2, 1, 1]).unwrap();
        let group = WorkingGroup::new(47, &mmm_operations(), &cell, 1e-6).unwrap();
        assert_eq!(group.len(), 16);
        assert_eq!(group.parent_index(9), 1);
        assert_eq!(group.translation(9), V3([1, 0, 0]));
        assert!(group.operations()[0].is_identity(1e-12));

        // a pure lattice translation of the parent is a half translation here
        let half = SymmetryOperation::translation(V3([0.5, 0.0, 0.0]));
        assert_eq!(group.locate(&half, 1e-6), Some(8));
    }

    #[test]
    fn x_point_characters_alternate_in_sign() {
        let cell = CellTransformation::diagonal([2, 1, 1]).unwrap();
        let group = WorkingGroup::new(47, &mmm_operations(), &cell, 1e-6).unwrap();
        let irrep = &mmm_irreps(V3([0.5, 0.0, 0.0]))[3];

        let chars = group.characters(irrep).unwrap();
        let parent = match irrep.characters {
            Characters::KVector { ref parent, .. } => parent.clone(),
            _ => unreachable!(),
        };
        assert_eq!(&chars[..8], &parent[..]);
        assert_eq!(chars[8..].to_vec(), parent.iter().map(|x| -x).collect::<Vec<_>>());
    }

    #[test]
    fn supercell_order_is_parent_order_times_volume() {
        let cell = CellTransformation::diagonal([2, 2, 2]).unwrap();
        let group = WorkingGroup::new(47, &mmm_operations(), &cell, 1e-6).unwrap();
        assert_eq!(group.len(), 8 * 8);
        assert_eq!(group.table().len(), 64);

        let skewed = mat::from_array([[1, 1, 0], [-1, 1, 0], [0, 0, 1]]);
        let cell = CellTransformation::new(&skewed, V3::zero()).unwrap();
        let group = WorkingGroup::new(47, &mmm_operations(), &cell, 1e-6).unwrap();
        assert_eq!(group.len(), 16);
    }

    #[test]
    fn k_point_must_fold_into_the_cell() {
        let irrep = &mmm_irreps(V3([0.5, 0.0, 0.0]))[3];

        let group = WorkingGroup::new(47, &mmm_operations(), &CellTransformation::identity(), 1e-6).unwrap();
        match group.characters(irrep) {
            Err(DataInconsistency::IncommensurateK { cell, .. }) => assert_eq!(cell, [[1, 0, 0], [0, 1, 0], [0, 0, 1]]),
            other => panic!("unexpected: {:?}", other),
        }

        // doubled along the wrong axis
        let cell = CellTransformation::diagonal([1, 2, 1]).unwrap();
        let group = WorkingGroup::new(47, &mmm_operations(), &cell, 1e-6).unwrap();
        assert!(group.characters(irrep).is_err());
    }

    #[test]
    fn uninvariant_cell_is_rejected() {
        // a fourfold axis along z does not preserve a 2x1x1 cell
        let c4 = SymmetryOperation::from(&[[0, -1, 0], [1, 0, 0], [0, 0, 1]]);
        let ops = vec![
            SymmetryOperation::eye(),
            c4.clone(),
            c4.then(&c4),
            c4.then(&c4).then(&c4),
        ];
        let cell = CellTransformation::diagonal([2, 1, 1]).unwrap();
        let err = WorkingGroup::new(75, &ops, &cell, 1e-6).unwrap_err();
        match err.downcast_ref::<DataInconsistency>() {
            Some(DataInconsistency::CellNotInvariant { operation: 1, .. }) => {},
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn unclosed_operations_are_rejected() {
        let c4 = SymmetryOperation::from(&[[0, -1, 0], [1, 0, 0], [0, 0, 1]]);
        let ops = vec![SymmetryOperation::eye(), c4];
        let err = WorkingGroup::new(75, &ops, &CellTransformation::identity(), 1e-6).unwrap_err();
        match err.downcast_ref::<DataInconsistency>() {
            Some(DataInconsistency::NotAGroup { .. }) => {},
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn character_count_is_checked() {
        let group = WorkingGroup::new(47, &mmm_operations(), &CellTransformation::identity(), 1e-6).unwrap();
        let irrep = Irrep::at_gamma("GM1+", vec![1.0; 4]);
        match group.characters(&irrep) {
            Err(DataInconsistency::CharacterCount { found: 4, expected: 8, .. }) => {},
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn multi_arm_star_is_rejected() {
        // k = (1/2, 1/2, 0) is fixed by mmm, but not by a fourfold rotation
        let c4 = SymmetryOperation::from(&[[0, -1, 0], [1, 0, 0], [0, 0, 1]]);
        let ops = vec![
            SymmetryOperation::eye(),
            c4.clone(),
            c4.then(&c4),
            c4.then(&c4).then(&c4),
        ];
        let cell = CellTransformation::diagonal([2, 2, 1]).unwrap();
        let group = WorkingGroup::new(75, &ops, &cell, 1e-6).unwrap();
        let irrep = Irrep::at_k("X1", V3([0.5, 0.0, 0.0]), vec![1.0; 4]);
        match group.characters(&irrep) {
            Err(DataInconsistency::MultiArmStar { operation: 1, .. }) => {},
            other => panic!("unexpected: {:?}", other),
        }
    }
}
