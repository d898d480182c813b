/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use serde::Serialize;

use isomode_structure::{OrbitId, GroupError};
use isomode_structure::find_perm::PositionMatchError;

/// The supplied symmetry data do not describe a consistent group action
/// on the structure.  Aborts basis construction.
#[derive(Debug, Fail)]
pub enum DataInconsistency {
    #[fail(display = "space group {}: operations do not form a group: {}", space_group, cause)]
    NotAGroup {
        space_group: u32,
        #[cause] cause: GroupError,
    },

    #[fail(display = "space group {}: operation {} does not map the working cell onto itself", space_group, operation)]
    CellNotInvariant { space_group: u32, operation: usize },

    #[fail(display = "space group {}: site {} is mapped by operation {} onto no site of the same species", space_group, site, operation)]
    StructureNotSymmetric { space_group: u32, site: usize, operation: usize },

    #[fail(display = "space group {}: operation {} maps orbit {} outside of itself", space_group, operation, orbit)]
    OrbitNotPreserved { space_group: u32, orbit: OrbitId, operation: usize },

    #[fail(display = "space group {}: site permutations of orbit {} are inconsistent with the group table", space_group, orbit)]
    OrbitPermutationsInconsistent { space_group: u32, orbit: OrbitId },

    #[fail(display = "space group {}: irrep {} has {} characters, but the group has {} operations", space_group, irrep, found, expected)]
    CharacterCount { space_group: u32, irrep: String, found: usize, expected: usize },

    #[fail(display = "space group {}: irrep {} has identity character {} (expected a positive integer)", space_group, irrep, value)]
    BadDimension { space_group: u32, irrep: String, value: f64 },

    #[fail(display = "space group {}: k-point of irrep {} is not invariant under operation {} (multi-arm stars need explicit characters)", space_group, irrep, operation)]
    MultiArmStar { space_group: u32, irrep: String, operation: usize },

    #[fail(display = "space group {}: k-point of irrep {} does not fold to Γ in the working cell {:?}", space_group, irrep, cell)]
    IncommensurateK { space_group: u32, irrep: String, cell: [[i32; 3]; 3] },

    #[fail(display = "space group {}: k-point of irrep {} gives a complex phase for translation {:?}", space_group, irrep, translation)]
    ComplexPhase { space_group: u32, irrep: String, translation: [i32; 3] },

    #[fail(display = "space group {}, orbit {}: irrep {} has non-integral multiplicity {}", space_group, orbit, irrep, value)]
    NonIntegralMultiplicity { space_group: u32, orbit: OrbitId, irrep: String, value: f64 },

    #[fail(display = "space group {}, orbit {}: projection onto irrep {} has rank {}, but its character predicts {}", space_group, orbit, irrep, rank, expected)]
    RankMismatch { space_group: u32, orbit: OrbitId, irrep: String, rank: usize, expected: usize },

    #[fail(display = "space group {}, orbit {}: irrep projections span {} of the expected {} dimensions", space_group, orbit, spanned, expected)]
    IncompleteProjection { space_group: u32, orbit: OrbitId, spanned: usize, expected: usize },

    #[fail(display = "space group {}: subgroup operation {} is not an element of the parent group", space_group, operation)]
    SubgroupNotContained { space_group: u32, operation: usize },

    #[fail(display = "space group {}: subgroup operations are not closed under composition", space_group)]
    SubgroupNotClosed { space_group: u32 },

    #[fail(display = "space group {}, orbit {}: supplied correspondence lists suborbits {:?}, but the subgroup splits the orbit into {:?}", space_group, orbit, supplied, derived)]
    CorrespondenceMismatch { space_group: u32, orbit: OrbitId, supplied: Vec<usize>, derived: Vec<usize> },
}

/// The distorted structure cannot be put into correspondence with the parent.
/// Aborts displacement extraction.
#[derive(Debug, Fail)]
pub enum StructureMismatch {
    #[fail(display = "reference has {} sites, but the distorted structure has {}", reference, distorted)]
    SiteCount { reference: usize, distorted: usize },

    #[fail(display = "site {}: expected species {}, found {}", site, expected, found)]
    Species { site: usize, expected: String, found: String },

    #[fail(display = "site {}: {} periodic images are within tolerance of the shortest displacement ({})", site, count, distance)]
    AmbiguousImage { site: usize, count: usize, distance: f64 },

    #[fail(display = "could not pair the distorted sites with the reference sites: {}", cause)]
    Unmatched { #[cause] cause: PositionMatchError },

    #[fail(display = "distorted lattice is not an integer multiple of the parent lattice: {:?}", coefficients)]
    NonIntegralCell { coefficients: [[f64; 3]; 3] },

    #[fail(display = "mode basis was built for a different cell transformation")]
    WrongBasis,
}

/// A large part of the distortion is not explained by the basis.
///
/// This is a warning, carried in the result rather than raised.
#[derive(Debug, Clone, PartialEq, Serialize, Fail)]
#[serde(rename_all = "kebab-case")]
#[fail(display = "residual {} exceeds {} of the distortion norm {} (fraction {})",
    residual, threshold, total, fraction)]
pub struct HighResidual {
    pub residual: f64,
    pub total: f64,
    pub fraction: f64,
    pub threshold: f64,
}
