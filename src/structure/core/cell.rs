/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use isomode_array_types::{V3, M33, mat};

use crate::{Lattice, SymmetryOperation, Tol};
use crate::util::reduce_frac_v3;

/// Relates a working cell (usually of the distorted structure) to the parent cell.
///
/// * `matrix` is an integer matrix whose rows are the working-cell lattice
///   vectors written in units of the parent lattice vectors.
/// * `origin` is the working-cell origin in parent fractional coordinates.
///
/// A working-cell fractional position `x_s` corresponds to the parent
/// fractional position `x_p = x_s * matrix + origin`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellTransformation {
    matrix: M33<i32>,
    origin: V3,
}

#[derive(Debug, Fail)]
#[fail(display = "cell transformation matrix is singular: {:?}", matrix)]
pub struct SingularTransformation {
    pub matrix: M33<i32>,
}

/// The working cell is not mapped onto itself by a parent rotation.
#[derive(Debug, Fail)]
#[fail(display = "rotation {:?} does not map the working cell onto itself", rot)]
pub struct NotInvariant {
    pub rot: M33<i32>,
}

impl CellTransformation {
    pub fn new(matrix: &M33<i32>, origin: V3) -> Result<Self, SingularTransformation>
    {
        if matrix.det() == 0 {
            return Err(SingularTransformation { matrix: *matrix });
        }
        Ok(CellTransformation { matrix: *matrix, origin })
    }

    pub fn identity() -> Self
    { CellTransformation { matrix: mat::eye(), origin: V3::zero() } }

    pub fn diagonal([a, b, c]: [i32; 3]) -> Result<Self, SingularTransformation>
    {
        let matrix = mat::from_array([[a, 0, 0], [0, b, 0], [0, 0, c]]);
        Self::new(&matrix, V3::zero())
    }

    pub fn matrix(&self) -> &M33<i32>
    { &self.matrix }

    pub fn origin(&self) -> V3
    { self.origin }

    pub fn with_origin(&self, origin: V3) -> Self
    { CellTransformation { origin, ..self.clone() } }

    /// Number of parent cells in the working cell.
    pub fn volume_ratio(&self) -> usize
    { self.matrix.det().abs() as usize }

    fn float_matrix(&self) -> M33
    { self.matrix.map(f64::from) }

    fn float_inverse(&self) -> M33
    { self.float_matrix().inv() }

    /// The lattice of the working cell.
    pub fn working_lattice(&self, parent: &Lattice) -> Lattice
    { parent.linear_combination(&self.matrix) }

    pub fn to_parent_frac(&self, working_frac: &V3) -> V3
    { working_frac * &self.float_matrix() + self.origin }

    pub fn from_parent_frac(&self, parent_frac: &V3) -> V3
    { (parent_frac - self.origin) * &self.float_inverse() }

    /// Parent lattice translations that are distinct modulo the working lattice.
    ///
    /// These are the integer vectors `n` (in parent fractional units) with
    /// working-cell coordinates `n * matrix⁻¹` in `[0, 1)`, in lexicographic
    /// order.  There are exactly `volume_ratio()` of them.
    pub fn coset_translations(&self) -> Vec<V3<i32>>
    {
        // The working cell's corners bound the search.
        let mut lo = [0i32; 3];
        let mut hi = [0i32; 3];
        for &(a, b, c) in &[
            (0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1),
            (1, 1, 0), (1, 0, 1), (0, 1, 1), (1, 1, 1),
        ] {
            let corner = V3([a, b, c]) * self.matrix;
            for k in 0..3 {
                lo[k] = lo[k].min(corner[k]);
                hi[k] = hi[k].max(corner[k]);
            }
        }

        let inverse = self.float_inverse();
        let inside = |x: f64| x > -1e-8 && x < 1.0 - 1e-8;
        let mut out = vec![];
        for i in lo[0]..=hi[0] {
            for j in lo[1]..=hi[1] {
                for k in lo[2]..=hi[2] {
                    let n = V3([i, j, k]);
                    let s = n.map(f64::from) * &inverse;
                    if s.0.iter().cloned().all(inside) {
                        out.push(n);
                    }
                }
            }
        }
        debug_assert_eq!(out.len(), self.volume_ratio());
        out
    }

    /// Express a parent-cell operation, followed by the parent lattice
    /// translation `shift`, in working-cell coordinates.
    ///
    /// `shift` is integral in the parent cell but generally fractional in the
    /// working cell, so it only vanishes modulo the working lattice.
    /// Fails if the rotation does not preserve the working lattice.
    pub fn transform_operation(
        &self,
        op: &SymmetryOperation,
        shift: V3<i32>,
        tol: f64,
    ) -> Result<SymmetryOperation, NotInvariant>
    {
        let p = self.float_matrix();
        let p_inv = self.float_inverse();

        let rot_t = p * &op.float_t() * &p_inv;
        let rot_t = Tol(tol).unfloat_m33(&rot_t).map_err(|_| NotInvariant { rot: op.rot() })?;

        // x_s' = x_s (P Rᵀ P⁻¹) + (o Rᵀ + τ + n - o) P⁻¹
        let trans = self.origin * &op.float_t() + op.trans() + shift.map(f64::from) - self.origin;
        let trans = trans * &p_inv;
        Ok(SymmetryOperation::from_rot_t(rot_t, reduce_frac_v3(&trans)))
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn cosets_of_diagonal_cell() {
        let cell = CellTransformation::diagonal([2, 1, 2]).unwrap();
        assert_eq!(cell.coset_translations(), vec![
            V3([0, 0, 0]), V3([0, 0, 1]), V3([1, 0, 0]), V3([1, 0, 1]),
        ]);
    }

    #[test]
    fn cosets_of_skewed_cell() {
        // sqrt(2) x sqrt(2) x 2
        let m = mat::from_array([[1, 1, 0], [-1, 1, 0], [0, 0, 2]]);
        let cell = CellTransformation::new(&m, V3::zero()).unwrap();
        let cosets = cell.coset_translations();
        assert_eq!(cosets.len(), 4);
        assert!(cosets.contains(&V3([0, 0, 0])));
        assert!(cosets.contains(&V3([0, 0, 1])));
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let m = mat::from_array([[1, 1, 0], [1, 1, 0], [0, 0, 2]]);
        assert!(CellTransformation::new(&m, V3::zero()).is_err());
    }

    #[test]
    fn operations_follow_the_origin() {
        let cell = CellTransformation::identity().with_origin(V3([0.5, 0.5, 0.5]));
        // inversion through the parent origin is inversion through
        // the working origin followed by a translation of (1,1,1) ~ 0
        let inversion = SymmetryOperation::from(&[[-1, 0, 0], [0, -1, 0], [0, 0, -1]]);
        let op = cell.transform_operation(&inversion, V3::zero(), 1e-8).unwrap();
        assert!(op.approx_eq(&inversion, 1e-12));

        // a fourfold rotation about z does not preserve a cell stretched along x
        let cell = CellTransformation::diagonal([2, 1, 1]).unwrap();
        let c4 = SymmetryOperation::from(&[[0, -1, 0], [1, 0, 0], [0, 0, 1]]);
        assert!(cell.transform_operation(&c4, V3::zero(), 1e-8).is_err());
    }

    #[test]
    fn parent_translations_are_fractional_in_a_supercell() {
        let cell = CellTransformation::diagonal([2, 2, 2]).unwrap();
        let eye = SymmetryOperation::eye();

        let op = cell.transform_operation(&eye, V3([1, 0, 1]), 1e-8).unwrap();
        assert!(op.approx_eq(&SymmetryOperation::translation(V3([0.5, 0.0, 0.5])), 1e-12));

        // a full working-cell vector is no translation at all
        let op = cell.transform_operation(&eye, V3([2, 0, 0]), 1e-8).unwrap();
        assert!(op.is_identity(1e-12));

        let distinct: Vec<_> = cell.coset_translations().into_iter()
            .map(|n| cell.transform_operation(&eye, n, 1e-8).unwrap())
            .collect();
        for (i, a) in distinct.iter().enumerate() {
            for b in &distinct[..i] {
                assert!(!a.approx_eq(b, 1e-8));
            }
        }
    }

    #[test]
    fn position_roundtrip() {
        let m = mat::from_array([[1, 1, 0], [-1, 1, 0], [0, 0, 2]]);
        let cell = CellTransformation::new(&m, V3([0.25, 0.0, 0.5])).unwrap();
        let x = V3([0.1, 0.2, 0.3]);
        assert_close!(abs=1e-12, cell.from_parent_frac(&cell.to_parent_frac(&x)), x);
    }
}
