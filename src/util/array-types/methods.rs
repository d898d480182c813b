/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::ops::{Add, Sub, Mul};

use crate::{V3, M3, M33};

/// The scalar types that vectors and matrices are used with.
pub trait Scalar: Copy + PartialEq
    + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self>
{
    fn zero() -> Self;
    fn one() -> Self;
}

impl Scalar for f64 {
    #[inline(always)] fn zero() -> Self { 0.0 }
    #[inline(always)] fn one() -> Self { 1.0 }
}

impl Scalar for i32 {
    #[inline(always)] fn zero() -> Self { 0 }
    #[inline(always)] fn one() -> Self { 1 }
}

// ---------------------------------------------------------------------------
// vectors

#[inline]
pub fn vee_from_fn<X>(mut f: impl FnMut(usize) -> X) -> V3<X>
{ V3([f(0), f(1), f(2)]) }

/// Dot product of two vectors.
#[inline]
pub fn dot<X: Scalar>(a: &V3<X>, b: &V3<X>) -> X
{ a.dot(b) }

impl<X: Scalar> V3<X> {
    #[inline]
    pub fn zero() -> Self
    { V3([X::zero(); 3]) }

    #[inline]
    pub fn from_fn(f: impl FnMut(usize) -> X) -> Self
    { vee_from_fn(f) }

    #[inline]
    pub fn dot(&self, other: &Self) -> X
    { self[0] * other[0] + self[1] * other[1] + self[2] * other[2] }

    #[inline]
    pub fn sqnorm(&self) -> X
    { self.dot(self) }

    /// Unit vector along one of the cartesian axes.
    #[inline]
    pub fn axis_unit(i: usize) -> Self
    { vee_from_fn(|k| if k == i { X::one() } else { X::zero() }) }
}

impl V3<f64> {
    #[inline]
    pub fn norm(&self) -> f64
    { self.sqnorm().sqrt() }
}

impl<X> V3<X> {
    #[inline]
    pub fn map<B>(self, mut f: impl FnMut(X) -> B) -> V3<B>
    {
        let V3([a, b, c]) = self;
        V3([f(a), f(b), f(c)])
    }

    #[inline]
    pub fn try_map<E, B>(self, mut f: impl FnMut(X) -> Result<B, E>) -> Result<V3<B>, E>
    {
        let V3([a, b, c]) = self;
        Ok(V3([f(a)?, f(b)?, f(c)?]))
    }
}

// ---------------------------------------------------------------------------
// matrices

#[inline]
pub fn from_array<X>(arr: [[X; 3]; 3]) -> M33<X>
{
    let [a, b, c] = arr;
    M3([V3(a), V3(b), V3(c)])
}

#[inline]
pub fn from_fn<X>(mut f: impl FnMut(usize, usize) -> X) -> M33<X>
{
    M3([
        vee_from_fn(|c| f(0, c)),
        vee_from_fn(|c| f(1, c)),
        vee_from_fn(|c| f(2, c)),
    ])
}

#[inline]
pub fn eye<X: Scalar>() -> M33<X>
{ from_fn(|r, c| if r == c { X::one() } else { X::zero() }) }

impl<X: Copy> M33<X> {
    /// Transpose.
    #[inline]
    pub fn t(&self) -> Self
    { from_fn(|r, c| self[c][r]) }

    #[inline]
    pub fn map<B>(&self, mut f: impl FnMut(X) -> B) -> M33<B>
    { M3([self[0].map(&mut f), self[1].map(&mut f), self[2].map(&mut f)]) }

    #[inline]
    pub fn try_map<E, B>(&self, mut f: impl FnMut(X) -> Result<B, E>) -> Result<M33<B>, E>
    { Ok(M3([self[0].try_map(&mut f)?, self[1].try_map(&mut f)?, self[2].try_map(&mut f)?])) }

    #[inline]
    pub fn into_array(self) -> [[X; 3]; 3]
    { [self[0].0, self[1].0, self[2].0] }
}

impl<X: Scalar> M33<X> {
    #[inline]
    pub fn det(&self) -> X
    { det(self) }

    #[inline]
    pub fn trace(&self) -> X
    { self[0][0] + self[1][1] + self[2][2] }
}

/// Determinant of a 3x3 matrix.
pub fn det<X: Scalar>(m: &M33<X>) -> X
{
    let [[a, b, c], [d, e, f], [g, h, i]] = m.into_array();
    a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
}

/// Inverse of a 3x3 matrix.
///
/// The matrix is assumed to be non-singular; callers that receive
/// untrusted matrices should check the determinant first.
pub fn inv(m: &M33<f64>) -> M33<f64>
{
    let [[a, b, c], [d, e, f], [g, h, i]] = m.into_array();
    let det = det(m);
    let cof = from_array([
        [e * i - f * h, c * h - b * i, b * f - c * e],
        [f * g - d * i, a * i - c * g, c * d - a * f],
        [d * h - e * g, b * g - a * h, a * e - b * d],
    ]);
    cof.map(|x| x / det)
}

impl M33<f64> {
    #[inline]
    pub fn inv(&self) -> Self
    { inv(self) }
}
