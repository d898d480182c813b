/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Decomposition of crystal distortions into symmetry-adapted modes.
//!
//! Given a parent structure with its space group operations and irreps, a
//! working cell (a supercell of the parent, possibly with a shifted origin)
//! and a distorted structure in that cell, this crate builds an orthonormal
//! basis of displacement modes labeled by irrep and Wyckoff orbit, and
//! projects the displacement field of the distortion onto it.

#![allow(semicolon_in_expressions_from_macros)]

#[macro_use] extern crate log;
#[macro_use] extern crate failure;
#[macro_use] extern crate itertools;
#[cfg(test)] #[macro_use] extern crate isomode_assert_close;
#[cfg(test)] #[macro_use] extern crate pretty_assertions;

pub type FailResult<T> = Result<T, failure::Error>;

macro_rules! throw {
    ($e:expr) => {
        return Err(::std::convert::Into::into($e));
    }
}

mod errors;
mod settings;
mod irrep;
mod group;
mod orbits;
mod linalg;
mod basis;
mod displacement;
mod decompose;
mod report;
mod cache;
mod provider;
mod matching;
#[cfg(test)] mod test_util;

pub use crate::errors::{DataInconsistency, StructureMismatch, HighResidual};
pub use crate::settings::{Settings, AmbiguousImages};
pub use crate::irrep::{Irrep, IrrepKind, Characters, KPoint};
pub use crate::group::WorkingGroup;
pub use crate::orbits::{assign_orbits, split_orbit, OrbitCorrespondence, OrbitSplit};
pub use crate::basis::{ModeBasisBuilder, ModeBasis, OrbitBasis, IrrepBlock, Mode};
pub use crate::displacement::{DisplacementExtractor, DistortionVector};
pub use crate::decompose::{ModeDecomposer, AmplitudeResult, Method};
pub use crate::report::{DecompositionReport, IrrepAmplitude, OrbitAmplitude, ModeAmplitude, CellSummary};
pub use crate::cache::{ModeBasisCache, BasisKey};
pub use crate::provider::{
    SymmetryDataProvider, StructureAdapter,
    TableProvider, SymmetryTables, GroupTable, OperationEntry, IrrepEntry, CharacterForm, CorrespondenceTable,
};
pub use crate::matching::derive_cell_transformation;

use std::sync::Arc;

use failure::ResultExt;

use isomode_structure::{Structure, SymmetryOperation, CellTransformation, supercell};

/// The high-symmetry parent: its structure and group-theoretical data.
#[derive(Debug, Clone)]
pub struct Parent {
    structure: Structure,
    space_group: u32,
    operations: Vec<SymmetryOperation>,
    irreps: Vec<Irrep>,
}

impl Parent {
    pub fn new(
        structure: Structure,
        space_group: u32,
        operations: Vec<SymmetryOperation>,
        irreps: Vec<Irrep>,
    ) -> Self
    { Parent { structure, space_group, operations, irreps } }

    /// Gather the operations of a space group and its irreps at some k-points.
    pub fn from_provider<P: SymmetryDataProvider + ?Sized>(
        provider: &P,
        structure: Structure,
        space_group: u32,
        k_points: &[KPoint],
    ) -> FailResult<Self>
    {Ok({
        let operations = provider.operations_for(space_group)
            .with_context(|_| format!("while fetching the operations of space group {}", space_group))?;

        let mut irreps = vec![];
        for k in k_points {
            let at_k = provider.irreps_for(space_group, k)
                .with_context(|_| format!("while fetching irreps of space group {} at {}", space_group, k.label))?;
            irreps.extend(at_k);
        }
        info!("space group {}: {} operations, {} irreps at {} k-points",
            space_group, operations.len(), irreps.len(), k_points.len());
        Parent::new(structure, space_group, operations, irreps)
    })}

    /// Relabel the sites of the structure by their orbits under the operations.
    pub fn with_assigned_orbits(self, settings: &Settings) -> FailResult<Self>
    {Ok({
        let structure = assign_orbits(&self.structure, &self.operations, self.space_group, settings.position_tol)?;
        Parent { structure, ..self }
    })}

    pub fn structure(&self) -> &Structure { &self.structure }
    pub fn space_group(&self) -> u32 { self.space_group }
    pub fn operations(&self) -> &[SymmetryOperation] { &self.operations }
    pub fn irreps(&self) -> &[Irrep] { &self.irreps }
}

/// An isotropy subgroup, by its operations in working-cell coordinates.
#[derive(Debug, Clone)]
pub struct Subgroup {
    /// Space group number, when known.
    pub number: Option<u32>,
    pub operations: Vec<SymmetryOperation>,
}

/// Build the symmetry-adapted basis of every orbit of the working cell.
///
/// With a subgroup, each block is restricted to the displacements invariant
/// under it.  A supplied correspondence is checked against the way the
/// subgroup actually splits the orbits.
pub fn build_mode_basis(
    parent: &Parent,
    cell: &CellTransformation,
    subgroup: Option<&Subgroup>,
    correspondence: Option<&OrbitCorrespondence>,
    settings: &Settings,
    cache: Option<&ModeBasisCache>,
) -> FailResult<ModeBasis>
{Ok({
    let space_group = parent.space_group;
    let group = WorkingGroup::new(space_group, &parent.operations, cell, settings.symmetry_tol)?;
    let mut builder = ModeBasisBuilder::new(&group, &parent.irreps, settings)?;
    if let Some(subgroup) = subgroup {
        builder = builder.with_subgroup(&subgroup.operations)?;
    }

    let reference = supercell::build(&parent.structure, cell).0;

    let mut orbits = vec![];
    for orbit in reference.orbit_ids() {
        let compute = || builder.build_orbit(&reference, &orbit);
        let basis = match cache {
            Some(cache) => {
                cache.get_or_try_insert_with(builder.basis_key(&reference, &orbit), compute)?
            },
            None => Arc::new(compute()?),
        };
        if let Some(correspondence) = correspondence {
            correspondence.check(&basis.split, space_group)?;
        }
        orbits.push(basis);
    }

    let basis = ModeBasis::new(
        space_group,
        subgroup.and_then(|s| s.number),
        cell.clone(),
        reference.num_sites(),
        orbits,
    );
    info!("space group {}: {} modes over {} orbits of {} sites",
        space_group, basis.len(), basis.orbits().len(), basis.num_sites());
    basis
})}

/// Decompose a distorted structure over a basis built by [`build_mode_basis`].
pub fn decompose(
    parent: &Parent,
    distorted: &Structure,
    basis: &ModeBasis,
    cell: &CellTransformation,
    settings: &Settings,
) -> FailResult<DecompositionReport>
{Ok({
    if basis.cell() != cell || basis.space_group() != parent.space_group {
        throw!(StructureMismatch::WrongBasis);
    }
    let (_, field) = DisplacementExtractor::new(settings).extract(&parent.structure, distorted, cell)?;
    let result = ModeDecomposer::new(settings).decompose(&field, basis)?;
    DecompositionReport::new(basis, &result)?
})}

/// Chains the steps of a decomposition over one provider and cache.
pub struct Decomposition<'a, P: SymmetryDataProvider + ?Sized> {
    provider: &'a P,
    cache: &'a ModeBasisCache,
    settings: Settings,
}

impl<'a, P: SymmetryDataProvider + ?Sized> Decomposition<'a, P> {
    pub fn new(provider: &'a P, cache: &'a ModeBasisCache, settings: Settings) -> Self
    { Decomposition { provider, cache, settings } }

    pub fn settings(&self) -> &Settings
    { &self.settings }

    pub fn parent(&self, structure: Structure, space_group: u32, k_points: &[KPoint]) -> FailResult<Parent>
    { Parent::from_provider(self.provider, structure, space_group, k_points) }

    pub fn basis(&self, parent: &Parent, cell: &CellTransformation, subgroup: Option<&Subgroup>) -> FailResult<ModeBasis>
    {Ok({
        let correspondence = match subgroup.and_then(|s| s.number) {
            Some(number) => self.provider.wyckoff_correspondence(parent.space_group, number, cell)?,
            None => None,
        };
        build_mode_basis(parent, cell, subgroup, correspondence.as_ref(), &self.settings, Some(self.cache))?
    })}

    pub fn run(
        &self,
        parent: &Parent,
        distorted: &Structure,
        cell: &CellTransformation,
        subgroup: Option<&Subgroup>,
    ) -> FailResult<DecompositionReport>
    {Ok({
        let basis = self.basis(parent, cell, subgroup)?;
        decompose(parent, distorted, &basis, cell, &self.settings)?
    })}
}
