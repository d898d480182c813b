/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use serde::{Serialize, Deserialize};

/// Numerical tolerances and policies of the core.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Cartesian distance within which a transformed site is identified with
    /// a site of the structure.
    #[serde(default = "self::defaults::settings::position_tol")]
    pub position_tol: f64,
    /// Fractional tolerance for comparing the translations of two operations.
    #[serde(default = "self::defaults::settings::symmetry_tol")]
    pub symmetry_tol: f64,
    /// Residual norm below which a projected trial vector is considered null.
    #[serde(default = "self::defaults::settings::rank_tol")]
    pub rank_tol: f64,
    #[serde(default = "self::defaults::settings::multiplicity_tol")]
    pub multiplicity_tol: f64,
    /// Largest deviation of the Gram matrix from the identity before
    /// amplitudes are solved for by least squares.
    #[serde(default = "self::defaults::settings::orthonormality_tol")]
    pub orthonormality_tol: f64,
    #[serde(default = "self::defaults::settings::ambiguity_tol")]
    pub ambiguity_tol: f64,
    #[serde(default)]
    pub ambiguous_images: AmbiguousImages,
    #[serde(default = "self::defaults::settings::residual_warning_fraction")]
    pub residual_warning_fraction: f64,
    /// Reorder the distorted sites onto the reference before comparing them.
    #[serde(default = "self::defaults::settings::match_sites")]
    pub match_sites: bool,
    /// Largest displacement accepted when pairing sites.
    #[serde(default = "self::defaults::settings::match_distance")]
    pub match_distance: f64,
    /// How far `L_distorted L_parent⁻¹` may be from an integer matrix.
    #[serde(default = "self::defaults::settings::lattice_tol")]
    pub lattice_tol: f64,
    /// Demand that the irreps account for every degree of freedom of an orbit.
    ///
    /// Turn this off when irreps are only supplied for some of the k-points
    /// that fold onto Γ of the working cell.
    #[serde(default = "self::defaults::settings::require_complete_basis")]
    pub require_complete_basis: bool,
}

/// What to do when two periodic images of a displacement are equally short.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AmbiguousImages {
    Error,
    LowestShift,
}

impl Default for AmbiguousImages {
    fn default() -> Self { AmbiguousImages::Error }
}

impl Default for Settings {
    fn default() -> Self {
        use self::defaults::settings as d;
        Settings {
            position_tol: d::position_tol(),
            symmetry_tol: d::symmetry_tol(),
            rank_tol: d::rank_tol(),
            multiplicity_tol: d::multiplicity_tol(),
            orthonormality_tol: d::orthonormality_tol(),
            ambiguity_tol: d::ambiguity_tol(),
            ambiguous_images: Default::default(),
            residual_warning_fraction: d::residual_warning_fraction(),
            match_sites: d::match_sites(),
            match_distance: d::match_distance(),
            lattice_tol: d::lattice_tol(),
            require_complete_basis: d::require_complete_basis(),
        }
    }
}

mod defaults {
    pub(crate) mod settings {
        pub(crate) fn position_tol() -> f64 { 1e-4 }
        pub(crate) fn symmetry_tol() -> f64 { 1e-5 }
        pub(crate) fn rank_tol() -> f64 { 1e-6 }
        pub(crate) fn multiplicity_tol() -> f64 { 1e-4 }
        pub(crate) fn orthonormality_tol() -> f64 { 1e-8 }
        pub(crate) fn ambiguity_tol() -> f64 { 1e-6 }
        pub(crate) fn residual_warning_fraction() -> f64 { 0.05 }
        pub(crate) fn match_sites() -> bool { true }
        pub(crate) fn match_distance() -> f64 { 1.0 }
        pub(crate) fn lattice_tol() -> f64 { 0.05 }
        pub(crate) fn require_complete_basis() -> bool { true }
    }
}
