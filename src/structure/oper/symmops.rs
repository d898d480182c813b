/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use isomode_array_types::{V3, M33, mat};

use crate::Lattice;
use crate::util::{reduce_frac, centered_frac_v3};

/// A spacegroup operation acting on fractional coordinates.
///
/// In the conventional column-vector form this is `x' = R x + t`.
/// Like the rest of the library the operation is stored in row form,
/// acting as `x' = x Rᵀ + t` on a row vector `x`.
///
/// Translations are kept reduced into `[0, 1)`, so two operations that
/// differ by a lattice translation compare as (nearly) equal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SymmetryOperation {
    /// This is the transpose of what one would
    /// typically think of as the "rotation matrix"
    ///
    /// Invariants:
    ///  - `abs(det(t)) == 1`
    rot_t: M33<i32>,
    /// Invariants:
    ///  - elements lie in `[0, 1)`.
    trans: V3,
}

#[derive(Debug, Fail)]
#[fail(display = "rotation matrix has determinant {} (expected +/-1): {:?}", det, rot)]
pub struct BadRotation {
    pub rot: M33<i32>,
    pub det: i32,
}

impl Default for SymmetryOperation {
    fn default() -> Self
    { Self::eye() }
}

impl SymmetryOperation {
    pub fn eye() -> Self
    { Self { rot_t: mat::eye(), trans: V3::zero() } }

    /// Construct from the conventional (column-vector) rotation matrix `R`
    /// and translation `t`.
    pub fn new(rot: &M33<i32>, trans: V3) -> Result<Self, BadRotation>
    {
        let det = rot.det();
        if det.abs() != 1 {
            return Err(BadRotation { rot: *rot, det });
        }
        Ok(Self::from_rot_t(rot.t(), trans))
    }

    /// A pure translation.
    pub fn translation(trans: V3) -> Self
    { Self::from_rot_t(mat::eye(), trans) }

    pub(crate) fn from_rot_t(rot_t: M33<i32>, trans: V3) -> Self
    { SymmetryOperation { rot_t, trans: trans.map(reduce_frac) } }

    /// The conventional rotation matrix `R`.
    pub fn rot(&self) -> M33<i32>
    { self.rot_t.t() }

    /// The transpose of `R`, which is the matrix applied to row vectors.
    pub fn rot_t(&self) -> &M33<i32>
    { &self.rot_t }

    /// Translation, reduced into `[0, 1)`.
    pub fn trans(&self) -> V3
    { self.trans }

    pub fn det(&self) -> i32
    { self.rot_t.det() }

    // transposed float matrix
    pub(crate) fn float_t(&self) -> M33
    { self.rot_t.map(f64::from) }
}

impl SymmetryOperation {
    /// Flipped group operator.
    ///
    /// `a.then(b) == b.of(a)`.  The flipped order is more aligned
    /// with this library's generally row-centric design.
    pub fn then(&self, other: &SymmetryOperation) -> SymmetryOperation
    {
        // (since these are transposes, this is the natural order of application)
        let rot_t = self.rot_t * other.rot_t;
        let trans = self.trans * &other.float_t() + other.trans;
        Self::from_rot_t(rot_t, trans)
    }

    /// Conventional group operator.
    pub fn of(&self, other: &SymmetryOperation) -> SymmetryOperation
    { other.then(self) }

    /// The inverse operation (modulo lattice translations).
    pub fn inverse(&self) -> SymmetryOperation
    {
        // R is unimodular, so its inverse is integral
        let inv_t = self.float_t().inv().map(|x| x.round() as i32);
        let trans = -(self.trans * &inv_t.map(f64::from));
        Self::from_rot_t(inv_t, trans)
    }

    /// Equality modulo lattice translations, up to an absolute
    /// tolerance on the fractional translations.
    pub fn approx_eq(&self, other: &SymmetryOperation, tol: f64) -> bool
    {
        self.rot_t == other.rot_t
            && centered_frac_v3(&(self.trans - other.trans)).0.iter().all(|x| x.abs() <= tol)
    }

    pub fn is_identity(&self, tol: f64) -> bool
    { self.approx_eq(&Self::eye(), tol) }
}

impl SymmetryOperation {
    pub fn transform_frac(&self, frac: &V3) -> V3
    { frac * &self.float_t() + self.trans }

    pub fn transform_fracs(&self, fracs: &[V3]) -> Vec<V3>
    {
        let rot_t = self.float_t();
        fracs.iter().map(|v| v * &rot_t + self.trans).collect()
    }

    /// The cartesian form of the rotation, as a matrix that acts on row vectors.
    ///
    /// For a lattice `L`, this is `L⁻¹ Rᵀ L`, so that a cartesian displacement
    /// `u` is rotated into `u * C`.
    pub fn cart_rot_t(&self, lattice: &Lattice) -> M33
    { lattice.inverse_matrix() * &self.float_t() * lattice.matrix() }
}

impl<'a> From<&'a [[i32; 3]; 3]> for SymmetryOperation {
    /// A pure rotation; panics if the matrix is not unimodular.
    fn from(m: &'a [[i32; 3]; 3]) -> Self
    {
        let rot = mat::from_array(*m);
        assert_eq!(rot.det().abs(), 1, "not a rotation: {:?}", m);
        SymmetryOperation::from_rot_t(rot.t(), V3::zero())
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn rot_transform()
    {
        let r = [
            [0, -1, 0],
            [1,  0, 0],
            [0,  0, 1],
        ];
        assert_eq!(
            SymmetryOperation::from(&r).transform_frac(&V3([1.0, 5.0, 7.0])),
            V3([-5.0, 1.0, 7.0]),
        );
    }

    #[test]
    fn two_transform()
    {
        // two operations that don't commute
        let xy = SymmetryOperation::from(&[
            [0, 1, 0],
            [1, 0, 0],
            [0, 0, 1],
        ]);
        let zx = SymmetryOperation::from(&[
            [0, 0, 1],
            [0, 1, 0],
            [1, 0, 0],
        ]).then(&SymmetryOperation::translation(V3([0.5, 0.0, 0.0])));
        let x = V3([0.125, 0.25, 0.375]);
        assert_eq!(
            zx.transform_frac(&xy.transform_frac(&x)),
            xy.then(&zx).transform_frac(&x),
        );
        assert_eq!(zx.of(&xy), xy.then(&zx));
    }

    #[test]
    fn symmop_mul()
    {
        let op = SymmetryOperation::new(
            &mat::from_array([
                [ 0,  1, 0],
                [-1,  1, 0],
                [ 0,  0, 1],
            ]),
            V3([1./3., 2./3., 0.0]),
        ).unwrap();
        let square = SymmetryOperation::new(
            &mat::from_array([
                [-1, 1, 0],
                [-1, 0, 0],
                [ 0, 0, 1],
            ]),
            V3([0., 0., 0.]),
        ).unwrap();

        assert!(op.then(&op).approx_eq(&square, 1e-12));
        assert!(op.then(&op.inverse()).is_identity(1e-12));
    }

    #[test]
    fn cartesian_rotation_of_cubic_cell_is_fractional_rotation() {
        let op = SymmetryOperation::from(&[[0, -1, 0], [1, 0, 0], [0, 0, 1]]);
        let c = op.cart_rot_t(&Lattice::cubic(3.9));
        assert_close!(abs=1e-12, c, op.rot_t().map(f64::from));
    }

    #[test]
    fn bad_rotations_are_rejected() {
        let m = mat::from_array([[2, 0, 0], [0, 1, 0], [0, 0, 1]]);
        assert!(SymmetryOperation::new(&m, V3::zero()).is_err());
    }
}
