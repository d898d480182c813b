/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Symmetry-adapted displacement bases.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use isomode_array_types::{V3, M33};
use isomode_structure::{Structure, OrbitId, Perm, SymmetryOperation, CellTransformation, find_perm};

use crate::{FailResult, Irrep, WorkingGroup, Settings, DataInconsistency, DistortionVector, BasisKey};
use crate::orbits::{OrbitSplit, OrbitCorrespondence, split_orbit};
use crate::linalg::{Orthonormalizer, flatten, unflatten};

/// The modes of one irrep within one orbit.
#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct IrrepBlock {
    pub irrep: String,
    /// Dimension of the irrep (its identity character).
    pub irrep_dimension: usize,
    /// Orthonormal displacement patterns, one displacement per orbit site.
    pub vectors: Vec<Vec<V3>>,
}

impl IrrepBlock {
    /// How many copies of the irrep the block contains.
    pub fn copies(&self) -> usize
    { self.vectors.len() / self.irrep_dimension.max(1) }
}

/// Every nonempty irrep block of one orbit.
#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct OrbitBasis {
    pub orbit: OrbitId,
    /// Working-cell site indices, in the order used by the block vectors.
    pub sites: Vec<usize>,
    pub blocks: Vec<IrrepBlock>,
    /// Subgroup orbits of the sites (a single suborbit without a subgroup).
    pub split: OrbitSplit,
}

impl OrbitBasis {
    pub fn dimension(&self) -> usize
    { self.blocks.iter().map(|b| b.vectors.len()).sum() }
}

/// A single mode of a [`ModeBasis`].
#[derive(Debug, Copy, Clone)]
pub struct Mode<'a> {
    pub orbit: &'a OrbitId,
    pub irrep: &'a str,
    /// Index within the (orbit, irrep) block.
    pub component: usize,
    pub sites: &'a [usize],
    pub vector: &'a [V3],
}

impl<'a> Mode<'a> {
    /// The mode as a displacement of every site of the working cell.
    pub fn to_full(&self, num_sites: usize) -> Vec<V3>
    {
        let mut out = vec![V3::zero(); num_sites];
        for (&site, &u) in self.sites.iter().zip(self.vector) {
            out[site] = u;
        }
        out
    }
}

/// Symmetry-adapted basis of the displacements of a working cell.
///
/// Modes are ordered by orbit, then by irrep (in the order the irreps were
/// supplied), then by component.
#[derive(Debug, Clone)]
pub struct ModeBasis {
    space_group: u32,
    subgroup: Option<u32>,
    cell: CellTransformation,
    num_sites: usize,
    orbits: Vec<Arc<OrbitBasis>>,
}

impl ModeBasis {
    pub fn new(
        space_group: u32,
        subgroup: Option<u32>,
        cell: CellTransformation,
        num_sites: usize,
        orbits: Vec<Arc<OrbitBasis>>,
    ) -> Self
    { ModeBasis { space_group, subgroup, cell, num_sites, orbits } }

    pub fn space_group(&self) -> u32 { self.space_group }
    pub fn subgroup(&self) -> Option<u32> { self.subgroup }
    pub fn cell(&self) -> &CellTransformation { &self.cell }
    pub fn num_sites(&self) -> usize { self.num_sites }
    pub fn orbits(&self) -> &[Arc<OrbitBasis>] { &self.orbits }

    pub fn len(&self) -> usize
    { self.orbits.iter().map(|o| o.dimension()).sum() }

    pub fn is_empty(&self) -> bool
    { self.len() == 0 }

    pub fn modes(&self) -> impl Iterator<Item=Mode<'_>> + '_
    {
        self.orbits.iter().flat_map(|orbit| {
            orbit.blocks.iter().flat_map(move |block| {
                block.vectors.iter().enumerate().map(move |(component, vector)| Mode {
                    orbit: &orbit.orbit,
                    irrep: &block.irrep,
                    component,
                    sites: &orbit.sites,
                    vector,
                })
            })
        })
    }

    /// Every mode as a flattened `3N` vector.
    pub fn full_vectors(&self) -> Vec<Vec<f64>>
    { self.modes().map(|m| flatten(&m.to_full(self.num_sites))).collect() }

    /// Irrep labels in order of first appearance.
    pub fn irrep_labels(&self) -> Vec<&str>
    {
        let mut out: Vec<&str> = vec![];
        for mode in self.modes() {
            if !out.contains(&mode.irrep) {
                out.push(mode.irrep);
            }
        }
        out
    }

    pub fn correspondence(&self) -> OrbitCorrespondence
    { OrbitCorrespondence { orbits: self.orbits.iter().map(|o| o.split.clone()).collect() } }

    /// The displacement field `Σ aᵢ mᵢ`.
    pub fn synthesize(&self, amplitudes: &[f64]) -> FailResult<DistortionVector>
    {Ok({
        ensure!(amplitudes.len() == self.len(),
            "expected {} amplitudes, got {}", self.len(), amplitudes.len());

        let mut field = vec![V3::zero(); self.num_sites];
        for (mode, &a) in self.modes().zip(amplitudes) {
            for (&site, &u) in mode.sites.iter().zip(mode.vector) {
                field[site] += a * u;
            }
        }
        DistortionVector::new(field)
    })}
}

/// Builds orbit bases for a working group and a set of irreps.
pub struct ModeBasisBuilder<'a> {
    group: &'a WorkingGroup,
    irreps: &'a [Irrep],
    settings: &'a Settings,
    // characters of each irrep over the working group
    characters: Vec<Vec<f64>>,
    dimensions: Vec<usize>,
    // members of the projection subgroup (just the identity if none)
    subgroup: Vec<usize>,
    restricted: bool,
}

impl<'a> ModeBasisBuilder<'a> {
    pub fn new(group: &'a WorkingGroup, irreps: &'a [Irrep], settings: &'a Settings) -> FailResult<Self>
    {Ok({
        let space_group = group.space_group();
        let identity = group.table().identity();

        let mut characters = Vec::with_capacity(irreps.len());
        let mut dimensions = Vec::with_capacity(irreps.len());
        for irrep in irreps {
            let chars = group.characters(irrep)?;
            let d = chars[identity];
            if !(d > 0.5 && (d - d.round()).abs() < 1e-6) {
                throw!(DataInconsistency::BadDimension { space_group, irrep: irrep.label.clone(), value: d });
            }
            dimensions.push(d.round() as usize);
            characters.push(chars);
        }

        ModeBasisBuilder {
            group, irreps, settings, characters, dimensions,
            subgroup: vec![identity],
            restricted: false,
        }
    })}

    /// Restrict the bases to displacements invariant under a subgroup.
    ///
    /// The operations are in working-cell fractional coordinates.
    pub fn with_subgroup(mut self, operations: &[SymmetryOperation]) -> FailResult<Self>
    {Ok({
        let space_group = self.group.space_group();
        let tol = self.settings.symmetry_tol;

        let mut members = Vec::with_capacity(operations.len());
        for (operation, op) in operations.iter().enumerate() {
            match self.group.locate(op, tol) {
                Some(m) => members.push(m),
                None => throw!(DataInconsistency::SubgroupNotContained { space_group, operation }),
            }
        }
        members.sort();
        members.dedup();

        let table = self.group.table();
        let set: HashSet<usize> = members.iter().cloned().collect();
        let closed = set.contains(&table.identity())
            && iproduct!(&members, &members).all(|(&a, &b)| set.contains(&table.product(a, b)));
        if !closed {
            throw!(DataInconsistency::SubgroupNotClosed { space_group });
        }

        trace!("subgroup of order {} (index {})", members.len(), self.group.len() / members.len());
        self.subgroup = members;
        self.restricted = true;
        self
    })}

    /// Working group members of the subgroup, if one was given.
    pub fn subgroup_members(&self) -> Option<&[usize]>
    {
        match self.restricted {
            true => Some(&self.subgroup),
            false => None,
        }
    }

    /// The cache key of the basis that [`Self::build_orbit`] would produce.
    pub fn basis_key(&self, reference: &Structure, orbit: &OrbitId) -> BasisKey
    {
        let sites = reference.sites_in_orbit(orbit);
        BasisKey::new(
            self.group.space_group(),
            self.subgroup_members().map(|m| m.to_vec()),
            self.group.cell(),
            orbit,
            sites.iter().map(|&i| (reference.site(i).species(), reference.site(i).frac())),
            izip!(self.irreps, &self.characters).map(|(irrep, chars)| (irrep.label.as_str(), &chars[..])),
        )
    }

    pub fn build_orbit(&self, reference: &Structure, orbit: &OrbitId) -> FailResult<OrbitBasis>
    {Ok({
        let space_group = self.group.space_group();
        let settings = self.settings;
        let sites = reference.sites_in_orbit(orbit);
        ensure!(!sites.is_empty(), "orbit {} has no sites", orbit);

        let action = OrbitAction::new(self.group, reference, &sites, settings.position_tol)
            .map_err(|bad| match bad {
                Some(operation) => DataInconsistency::OrbitNotPreserved {
                    space_group, operation,
                    orbit: orbit.clone(),
                },
                None => DataInconsistency::OrbitPermutationsInconsistent {
                    space_group,
                    orbit: orbit.clone(),
                },
            })?;
        let num_dof = 3 * sites.len();
        let order = self.group.len() as f64;
        let table = self.group.table();
        let h_order = self.subgroup.len() as f64;

        let mut blocks = vec![];
        let mut spanned = 0;
        for (irrep, chars, &dim) in izip!(self.irreps, &self.characters, &self.dimensions) {
            let coef = dim as f64 / order * irrep.kind.projector_factor();

            // tr(P_Γ P_H)
            let expected = coef / h_order * (0..self.group.len()).map(|g| {
                if chars[g] == 0.0 {
                    return 0.0;
                }
                let sum: f64 = self.subgroup.iter().map(|&h| action.trace(table.product(h, g))).sum();
                chars[g] * sum
            }).sum::<f64>();

            if (expected - expected.round()).abs() > settings.multiplicity_tol || expected < -0.5 {
                throw!(DataInconsistency::NonIntegralMultiplicity {
                    space_group,
                    orbit: orbit.clone(),
                    irrep: irrep.label.clone(),
                    value: expected,
                });
            }
            let expected = expected.round() as usize;
            if expected == 0 {
                trace!("orbit {}: no {} modes", orbit, irrep.label);
                continue;
            }

            let weights: Vec<f64> = chars.iter().map(|&x| coef * x).collect();
            let mut gs = Orthonormalizer::new(settings.rank_tol);
            for site in 0..sites.len() {
                for axis in 0..3 {
                    let image = action.apply_to_unit(site, axis, &weights);
                    let image = match self.restricted {
                        true => action.average(&image, &self.subgroup),
                        false => image,
                    };
                    gs.push(flatten(&image));
                    if gs.len() == num_dof {
                        break;
                    }
                }
            }

            if gs.len() != expected {
                throw!(DataInconsistency::RankMismatch {
                    space_group,
                    orbit: orbit.clone(),
                    irrep: irrep.label.clone(),
                    rank: gs.len(),
                    expected,
                });
            }
            trace!("orbit {}: {} modes of {}", orbit, expected, irrep.label);
            spanned += expected;
            blocks.push(IrrepBlock {
                irrep: irrep.label.clone(),
                irrep_dimension: dim,
                vectors: gs.into_vectors().iter().map(|v| unflatten(v)).collect(),
            });
        }

        // tr(P_H)
        let total = self.subgroup.iter().map(|&h| action.trace(h)).sum::<f64>() / h_order;
        let total = total.round() as usize;
        if spanned != total {
            if settings.require_complete_basis {
                throw!(DataInconsistency::IncompleteProjection {
                    space_group,
                    orbit: orbit.clone(),
                    spanned,
                    expected: total,
                });
            }
            debug!("orbit {}: irreps span {} of {} dimensions", orbit, spanned, total);
        }

        let perms: Vec<&Perm> = self.subgroup.iter().map(|&h| &action.perms[h]).collect();
        let split = OrbitSplit {
            parent: orbit.clone(),
            suborbits: split_orbit(&sites, &perms),
        };
        debug!("orbit {}: {} sites, {} modes in {} blocks, {} suborbits",
            orbit, sites.len(), spanned, blocks.len(), split.suborbits.len());

        OrbitBasis { orbit: orbit.clone(), sites, blocks, split }
    })}
}

/// The mechanical representation of a working group on one orbit.
struct OrbitAction {
    perms: Vec<Perm>,
    // Cartesian rotation of each member; a displacement u becomes u * rot
    rots: Vec<M33>,
}

impl OrbitAction {
    /// Fails with the index of an operation that does not preserve the orbit,
    /// or with `None` if every operation does on its own.
    fn new(group: &WorkingGroup, reference: &Structure, sites: &[usize], tol: f64) -> Result<Self, Option<usize>>
    {
        let lattice = reference.lattice();
        let fracs: Vec<V3> = sites.iter().map(|&i| reference.site(i).frac()).collect();
        let species: Vec<&str> = sites.iter().map(|&i| reference.site(i).species()).collect();
        let ops = group.operations();

        let perms = match find_perm::of_group(lattice, &fracs, &species, ops, group.table(), tol) {
            Ok(perms) => perms,
            Err(_) => {
                return Err(ops.iter().position(|op| {
                    find_perm::of_operation(lattice, &fracs, &species, op, tol).is_err()
                }));
            },
        };
        let rots = ops.iter().map(|op| op.cart_rot_t(lattice)).collect();
        Ok(OrbitAction { perms, rots })
    }

    fn num_sites(&self) -> usize
    { self.perms[0].len() }

    /// Character of the mechanical representation.
    fn trace(&self, member: usize) -> f64
    {
        let perm = &self.perms[member];
        let fixed = (0..perm.len()).filter(|&i| perm.get(i) == i).count();
        fixed as f64 * self.rots[member].trace()
    }

    /// `Σ_g weights[g] D(g) e`, for a unit displacement `e` along a
    /// Cartesian axis at one site.
    fn apply_to_unit(&self, site: usize, axis: usize, weights: &[f64]) -> Vec<V3>
    {
        let mut out = vec![V3::zero(); self.num_sites()];
        for (perm, rot, &w) in izip!(&self.perms, &self.rots, weights) {
            if w != 0.0 {
                out[perm.get(site)] += w * rot[axis];
            }
        }
        out
    }

    /// `(1/|H|) Σ_h D(h) u`
    fn average(&self, field: &[V3], members: &[usize]) -> Vec<V3>
    {
        let mut out = vec![V3::zero(); field.len()];
        let w = 1.0 / members.len() as f64;
        for &h in members {
            let (perm, rot) = (&self.perms[h], &self.rots[h]);
            for (site, u) in field.iter().enumerate() {
                out[perm.get(site)] += w * (u * rot);
            }
        }
        out
    }
}
