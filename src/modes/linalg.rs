/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Dense vector helpers over flattened displacement fields.

use isomode_array_types::V3;

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64
{
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub(crate) fn norm(a: &[f64]) -> f64
{ dot(a, a).sqrt() }

/// `y += alpha x`
pub(crate) fn axpy(alpha: f64, x: &[f64], y: &mut [f64])
{
    assert_eq!(x.len(), y.len());
    for (y, x) in y.iter_mut().zip(x) {
        *y += alpha * x;
    }
}

pub(crate) fn flatten(field: &[V3]) -> Vec<f64>
{ field.iter().flat_map(|v| v.0.iter().cloned()).collect() }

pub(crate) fn unflatten(flat: &[f64]) -> Vec<V3>
{
    assert_eq!(flat.len() % 3, 0);
    flat.chunks(3).map(|c| V3([c[0], c[1], c[2]])).collect()
}

/// Incremental modified Gram-Schmidt with rank detection.
///
/// Each candidate is orthogonalized twice against the accepted vectors;
/// it is accepted if the remaining norm exceeds the tolerance.
pub(crate) struct Orthonormalizer {
    vectors: Vec<Vec<f64>>,
    tol: f64,
}

impl Orthonormalizer {
    pub(crate) fn new(tol: f64) -> Self
    { Orthonormalizer { vectors: vec![], tol } }

    pub(crate) fn len(&self) -> usize
    { self.vectors.len() }

    /// Returns whether the vector was linearly independent of the others.
    pub(crate) fn push(&mut self, mut v: Vec<f64>) -> bool
    {
        for _pass in 0..2 {
            for u in &self.vectors {
                let c = dot(u, &v);
                axpy(-c, u, &mut v);
            }
        }
        let n = norm(&v);
        if n <= self.tol {
            return false;
        }
        v.iter_mut().for_each(|x| *x /= n);
        self.vectors.push(v);
        true
    }

    pub(crate) fn into_vectors(self) -> Vec<Vec<f64>>
    { self.vectors }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn rank_is_detected() {
        let mut gs = Orthonormalizer::new(1e-8);
        assert!(gs.push(vec![1.0, 1.0, 0.0]));
        assert!(gs.push(vec![1.0, 0.0, 0.0]));
        assert!(!gs.push(vec![3.0, -2.0, 0.0]));
        assert!(gs.push(vec![0.0, 0.0, 1e-3]));
        assert_eq!(gs.len(), 3);

        let vs = gs.into_vectors();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_close!(abs=1e-12, dot(&vs[i], &vs[j]), expected);
            }
        }
    }

    #[test]
    fn flatten_roundtrip() {
        let field = vec![V3([1.0, 2.0, 3.0]), V3([4.0, 5.0, 6.0])];
        assert_eq!(flatten(&field), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(unflatten(&flatten(&field)), field);
    }
}
