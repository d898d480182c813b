/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::IntPrecisionError;

use isomode_array_types::{V3, M33};

// these f64 -> i32 conversions are written on a silly little type
// simply to avoid having a function with a signature like 'fn f(x: f64, tol: f64)'
// where the arguments could be swapped
/// An absolute tolerance for recovering integers from floats.
#[derive(Debug, Copy, Clone)]
pub struct Tol(pub f64);

impl Tol {
    pub fn unfloat(&self, x: f64) -> Result<i32, IntPrecisionError>
    {Ok({
        let r = x.round();
        if !((r - x).abs() <= self.0) {
            return Err(IntPrecisionError {
                backtrace: failure::Backtrace::new(),
                value: x,
            });
        }
        r as i32
    })}

    pub fn unfloat_v3(&self, v: &V3) -> Result<V3<i32>, IntPrecisionError>
    { v.try_map(|x| self.unfloat(x)) }

    pub fn unfloat_m33(&self, m: &M33) -> Result<M33<i32>, IntPrecisionError>
    { m.try_map(|x| self.unfloat(x)) }

    /// Test whether every element of a vector is integral.
    pub fn is_integral_v3(&self, v: &V3) -> bool
    { self.unfloat_v3(v).is_ok() }
}

/// Reduce fractional coordinates into `[0, 1)`.
///
/// Values within `1e-12` below an integer are mapped to zero,
/// so that the output never contains `1.0` due to rounding.
pub(crate) fn reduce_frac(x: f64) -> f64
{
    let r = x - x.floor();
    if r >= 1.0 - 1e-12 { 0.0 } else { r }
}

pub(crate) fn reduce_frac_v3(v: &V3) -> V3
{ v.map(reduce_frac) }

/// `v - round(v)`, the representative of `v` closest to the origin.
pub(crate) fn centered_frac_v3(v: &V3) -> V3
{ v.map(|x| x - x.round()) }

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn unfloat() {
        assert_eq!(Tol(1e-4).unfloat(2.00001).unwrap(), 2);
        assert_eq!(Tol(1e-4).unfloat(-0.99999).unwrap(), -1);
        assert!(Tol(1e-4).unfloat(0.5).is_err());
        assert!(Tol(1e-4).unfloat(std::f64::NAN).is_err());
    }

    #[test]
    fn reduction() {
        assert_eq!(reduce_frac(-0.25), 0.75);
        assert_eq!(reduce_frac(1.0), 0.0);
        assert_eq!(reduce_frac(-1e-17), 0.0);
        assert_eq!(centered_frac_v3(&V3([0.75, -0.6, 2.0])).map(|x| (x * 100.0).round()), V3([-25.0, 40.0, 0.0]));
    }
}
