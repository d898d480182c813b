/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::ops::{Add, Sub, Neg, Mul, Div};
use std::ops::{AddAssign, SubAssign, MulAssign, DivAssign};
use std::iter::Sum;

use crate::{V3, M3, M33};

// NOTE: Operator impls are only between same-typed operands, and are
//       generated for the handful of scalar types actually in use.

macro_rules! impl_binop_all_refs {
    ($Trait:ident :: $method:ident for $A:ty, $B:ty => $Out:ty, |$a:ident, $b:ident| $body:expr) => {
        impl $Trait<$B> for $A {
            type Output = $Out;
            #[inline]
            fn $method(self, $b: $B) -> $Out { let $a = &self; let $b = &$b; $body }
        }
        impl<'b> $Trait<&'b $B> for $A {
            type Output = $Out;
            #[inline]
            fn $method(self, $b: &'b $B) -> $Out { let $a = &self; $body }
        }
        impl<'a> $Trait<$B> for &'a $A {
            type Output = $Out;
            #[inline]
            fn $method(self, $b: $B) -> $Out { let $a = self; let $b = &$b; $body }
        }
        impl<'a, 'b> $Trait<&'b $B> for &'a $A {
            type Output = $Out;
            #[inline]
            fn $method(self, $b: &'b $B) -> $Out { let $a = self; $body }
        }
    };
}

macro_rules! impl_scalar_ops {
    ($X:ty) => {
        // vector (+|-) vector
        impl_binop_all_refs!(Add::add for V3<$X>, V3<$X> => V3<$X>, |a, b| {
            V3([a[0] + b[0], a[1] + b[1], a[2] + b[2]])
        });
        impl_binop_all_refs!(Sub::sub for V3<$X>, V3<$X> => V3<$X>, |a, b| {
            V3([a[0] - b[0], a[1] - b[1], a[2] - b[2]])
        });

        // row vector * matrix
        impl_binop_all_refs!(Mul::mul for V3<$X>, M33<$X> => V3<$X>, |v, m| {
            V3([
                v[0] * m[0][0] + v[1] * m[1][0] + v[2] * m[2][0],
                v[0] * m[0][1] + v[1] * m[1][1] + v[2] * m[2][1],
                v[0] * m[0][2] + v[1] * m[1][2] + v[2] * m[2][2],
            ])
        });

        // matrix * column vector
        impl_binop_all_refs!(Mul::mul for M33<$X>, V3<$X> => V3<$X>, |m, v| {
            V3([m[0].dot(v), m[1].dot(v), m[2].dot(v)])
        });

        // matrix * matrix
        impl_binop_all_refs!(Mul::mul for M33<$X>, M33<$X> => M33<$X>, |a, b| {
            M3([a[0] * b, a[1] * b, a[2] * b])
        });

        // matrix (+|-) matrix
        impl_binop_all_refs!(Add::add for M33<$X>, M33<$X> => M33<$X>, |a, b| {
            M3([a[0] + b[0], a[1] + b[1], a[2] + b[2]])
        });
        impl_binop_all_refs!(Sub::sub for M33<$X>, M33<$X> => M33<$X>, |a, b| {
            M3([a[0] - b[0], a[1] - b[1], a[2] - b[2]])
        });

        // vector (*|/) scalar
        impl Mul<$X> for V3<$X> {
            type Output = V3<$X>;
            #[inline]
            fn mul(self, s: $X) -> V3<$X> { V3([self[0] * s, self[1] * s, self[2] * s]) }
        }
        impl<'a> Mul<$X> for &'a V3<$X> {
            type Output = V3<$X>;
            #[inline]
            fn mul(self, s: $X) -> V3<$X> { *self * s }
        }
        impl Mul<V3<$X>> for $X {
            type Output = V3<$X>;
            #[inline]
            fn mul(self, v: V3<$X>) -> V3<$X> { v * self }
        }
        impl<'a> Mul<&'a V3<$X>> for $X {
            type Output = V3<$X>;
            #[inline]
            fn mul(self, v: &'a V3<$X>) -> V3<$X> { *v * self }
        }
        impl Div<$X> for V3<$X> {
            type Output = V3<$X>;
            #[inline]
            fn div(self, s: $X) -> V3<$X> { V3([self[0] / s, self[1] / s, self[2] / s]) }
        }
        impl<'a> Div<$X> for &'a V3<$X> {
            type Output = V3<$X>;
            #[inline]
            fn div(self, s: $X) -> V3<$X> { *self / s }
        }

        // matrix * scalar
        impl Mul<$X> for M33<$X> {
            type Output = M33<$X>;
            #[inline]
            fn mul(self, s: $X) -> M33<$X> { M3([self[0] * s, self[1] * s, self[2] * s]) }
        }
        impl<'a> Mul<$X> for &'a M33<$X> {
            type Output = M33<$X>;
            #[inline]
            fn mul(self, s: $X) -> M33<$X> { *self * s }
        }

        impl Neg for V3<$X> {
            type Output = V3<$X>;
            #[inline]
            fn neg(self) -> V3<$X> { V3([-self[0], -self[1], -self[2]]) }
        }
        impl<'a> Neg for &'a V3<$X> {
            type Output = V3<$X>;
            #[inline]
            fn neg(self) -> V3<$X> { -*self }
        }

        impl AddAssign<V3<$X>> for V3<$X> {
            #[inline]
            fn add_assign(&mut self, other: V3<$X>) { *self = *self + other; }
        }
        impl<'b> AddAssign<&'b V3<$X>> for V3<$X> {
            #[inline]
            fn add_assign(&mut self, other: &'b V3<$X>) { *self = *self + other; }
        }
        impl SubAssign<V3<$X>> for V3<$X> {
            #[inline]
            fn sub_assign(&mut self, other: V3<$X>) { *self = *self - other; }
        }
        impl<'b> SubAssign<&'b V3<$X>> for V3<$X> {
            #[inline]
            fn sub_assign(&mut self, other: &'b V3<$X>) { *self = *self - other; }
        }
        impl MulAssign<$X> for V3<$X> {
            #[inline]
            fn mul_assign(&mut self, s: $X) { *self = *self * s; }
        }
        impl DivAssign<$X> for V3<$X> {
            #[inline]
            fn div_assign(&mut self, s: $X) { *self = *self / s; }
        }

        impl Sum for V3<$X> {
            fn sum<I: Iterator<Item = V3<$X>>>(iter: I) -> Self
            { iter.fold(V3::zero(), |a, b| a + b) }
        }
        impl<'a> Sum<&'a V3<$X>> for V3<$X> {
            fn sum<I: Iterator<Item = &'a V3<$X>>>(iter: I) -> Self
            { iter.fold(V3::zero(), |a, b| a + b) }
        }
    };
}

impl_scalar_ops!(f64);
impl_scalar_ops!(i32);

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::{V3, mat};

    #[test]
    fn row_vector_convention() {
        let m = mat::from_array([
            [1, 2, 0],
            [0, 1, 0],
            [0, 0, 3],
        ]);
        // (row vector) picks a linear combination of rows
        assert_eq!(V3([1, 1, 1]) * m, V3([1, 3, 3]));
        // (column vector) picks a linear combination of columns
        assert_eq!(m * V3([1, 1, 1]), V3([3, 1, 3]));
        assert_eq!(V3([1, 1, 1]) * m, m.t() * V3([1, 1, 1]));
    }

    #[test]
    fn matrix_product_order() {
        let a = mat::from_array([[2.0, 2.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 2.0]]);
        let b = mat::from_array([[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(a * b, mat::from_array([[2.0, 2.0, 0.0], [4.0, 0.0, 0.0], [0.0, 0.0, 2.0]]));
        assert_eq!(b * a, mat::from_array([[0.0, 4.0, 0.0], [2.0, 2.0, 0.0], [0.0, 0.0, 2.0]]));
    }
}
