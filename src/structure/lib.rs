/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Periodic crystal structures and their symmetry operations.
//!
//! Conventions (used throughout the workspace):
//!
//! * Lattice matrices have lattice vectors as rows.
//! * Positions are row vectors; `cart = frac * lattice`.
//! * Group operators are written in "row-centric" order:
//!   `a.then(b)` is `a` followed by `b`.

#[macro_use] extern crate log;
#[macro_use] extern crate failure;
#[macro_use] extern crate itertools;
#[cfg(test)] #[macro_use] extern crate isomode_assert_close;
#[cfg(feature = "serde")] #[macro_use] extern crate serde;

pub type FailResult<T> = Result<T, failure::Error>;

#[derive(Debug, Fail)]
#[fail(display = "Not nearly an integer: {}", value)]
pub struct IntPrecisionError {
    backtrace: failure::Backtrace,
    value: f64,
}

mod core;
mod algo;
mod oper;
mod util;

//---------------------------
// public reexports; API

pub use crate::core::lattice::{Lattice, DegenerateLattice};
pub use crate::core::structure::{Structure, Site, OrbitId, SiteCountMismatch};
pub use crate::core::cell::{CellTransformation, SingularTransformation, NotInvariant};

pub use crate::oper::symmops::{SymmetryOperation, BadRotation};
pub use crate::oper::perm::{Perm, Permute, InvalidPerm};

pub use crate::algo::group::{GroupTree, CayleyTable, GroupError};
pub use crate::algo::nearest_image::{MinimumImage, Image, AmbiguousImage};

pub mod supercell {
    pub use crate::algo::supercell::{build, SupercellToken};
}

pub use crate::algo::find_perm;

pub use crate::util::Tol;
