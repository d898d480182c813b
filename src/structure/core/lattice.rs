/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::ops::{Mul, Div};
use std::sync::Arc;

use isomode_array_types::{V3, M33, mat};
use isomode_assert_close::{CheckClose, Tolerances, CheckCloseError};

/// Lattice vectors of a periodic cell, as the rows of a matrix.
///
/// Fractional row vectors multiply against it to give Cartesian ones
/// (`frac * &lattice == cart`, and `cart / &lattice == frac`).
#[derive(Debug, Clone)]
pub struct Lattice {
    matrix: Arc<M33>,
    inverse: Arc<M33>,
}

/// Volumes below this are considered degenerate.
pub const MIN_VOLUME: f64 = 1e-10;

#[derive(Debug, Fail)]
#[fail(display = "lattice vectors are linearly dependent (volume {:e}): {:?}", volume, matrix)]
pub struct DegenerateLattice {
    pub matrix: M33,
    pub volume: f64,
}

// the inverse is derived data
impl PartialEq<Lattice> for Lattice {
    fn eq(&self, other: &Lattice) -> bool {
        let Lattice { ref matrix, inverse: _ } = *self;
        matrix == &other.matrix
    }
}

impl Lattice {
    /// The matrix must be non-singular; use [`Lattice::checked_new`] for
    /// matrices read from files.
    #[inline]
    pub fn new(matrix: &M33) -> Self {
        let inverse = Arc::new(matrix.inv());
        let matrix = Arc::new(*matrix);
        Lattice { matrix, inverse }
    }

    pub fn checked_new(matrix: &M33) -> Result<Self, DegenerateLattice> {
        let volume = matrix.det().abs();
        if !(volume > MIN_VOLUME) {
            return Err(DegenerateLattice { matrix: *matrix, volume });
        }
        Ok(Lattice::new(matrix))
    }

    #[inline]
    pub fn matrix(&self) -> &M33
    { &self.matrix }

    /// The precomputed inverse of `matrix`.
    #[inline]
    pub fn inverse_matrix(&self) -> &M33
    { &self.inverse }

    pub fn volume(&self) -> f64
    { self.matrix().det().abs() }

    /// The lattice whose rows are `coeffs * self`.
    pub fn linear_combination(&self, coeffs: &M33<i32>) -> Lattice
    { Lattice::new(&(coeffs.map(f64::from) * self.matrix())) }

    /// The (nearly integral) `m` with `m * other == self`.
    pub fn coefficients_over(&self, other: &Lattice) -> M33
    { self.matrix() * other.inverse_matrix() }
}

impl Lattice {
    #[inline]
    pub fn diagonal(&[x, y, z]: &[f64; 3]) -> Self { Lattice::orthorhombic(x, y, z) }

    #[inline]
    pub fn cubic(a: f64) -> Self { Lattice::orthorhombic(a, a, a) }

    #[inline]
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> Self
    { Lattice::from(&[[a, 0., 0.], [0., b, 0.], [0., 0., c]]) }
}

impl<'a> From<&'a [[f64; 3]; 3]> for Lattice {
    #[inline(always)]
    fn from(m: &'a [[f64; 3]; 3]) -> Self
    { Lattice::new(&mat::from_array(*m)) }
}

impl<'a, 'b> Mul<&'b Lattice> for &'a V3 {
    type Output = V3;

    fn mul(self, other: &'b Lattice) -> V3 {
        self * other.matrix()
    }
}

impl<'b> Mul<&'b Lattice> for V3 {
    type Output = V3;

    fn mul(self, other: &'b Lattice) -> V3 {
        self * other.matrix()
    }
}

impl<'a, 'b> Div<&'b Lattice> for &'a V3 {
    type Output = V3;

    fn div(self, other: &'b Lattice) -> V3 {
        self * other.inverse_matrix()
    }
}

impl<'b> Div<&'b Lattice> for V3 {
    type Output = V3;

    fn div(self, other: &'b Lattice) -> V3 {
        self * other.inverse_matrix()
    }
}

impl CheckClose for Lattice {
    fn check_close(&self, other: &Lattice, tol: Tolerances) -> Result<(), CheckCloseError> {
        self.matrix().check_close(other.matrix(), tol)
    }
}
