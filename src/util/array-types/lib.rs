/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Small fixed-size vectors and matrices.
//!
//! Matrices are stored row-major as `M3<V3<X>>`, and the library is
//! predominantly row-centric: a vector multiplied against a matrix is
//! a row vector (`v * m`), which is the form in which fractional
//! coordinates are converted to cartesian coordinates (`frac * lattice`).

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

mod types;
mod ops;
mod methods;
mod conv;

pub use crate::types::{V3, M3, M33};
pub use crate::conv::{Envee, Unvee};
pub use crate::methods::{dot, det, inv, Scalar};

/// Constructors for matrices.
pub mod mat {
    pub use crate::methods::{from_array, from_fn, eye};
}

/// Constructors for vectors.
pub mod vee {
    pub use crate::methods::vee_from_fn as from_fn;
}
