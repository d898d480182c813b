/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! `assert_close!` and the trait that backs it.
//!
//! ```ignore
//! assert_close!(a, b);
//! assert_close!(abs=1e-8, a, b);
//! assert_close!(rel=1e-6, abs=1e-10, a, b, "context: {}", x);
//! ```
//!
//! Two values are close when `|a - b| < max(abs, rel * |a|, rel * |b|)`.

#[macro_use]
extern crate failure;

use std::fmt;
use isomode_array_types::{V3, M33};

pub const DEFAULT_NONZERO_TOL: f64 = 1e-9;

#[macro_export]
macro_rules! assert_close {
    (rel=$rel:expr, abs=$abs:expr, $($rest:tt)+) => {
        $crate::assert_close!(@go [$abs, $rel] $($rest)+)
    };
    (abs=$abs:expr, rel=$rel:expr, $($rest:tt)+) => {
        $crate::assert_close!(@go [$abs, $rel] $($rest)+)
    };
    (abs=$abs:expr, $($rest:tt)+) => {
        $crate::assert_close!(@go [$abs, $crate::DEFAULT_NONZERO_TOL] $($rest)+)
    };
    (rel=$rel:expr, $($rest:tt)+) => {
        $crate::assert_close!(@go [0.0, $rel] $($rest)+)
    };
    (@go [$abs:expr, $rel:expr] $a:expr, $b:expr $(,)*) => {
        $crate::assert_close!(@go [$abs, $rel] $a, $b, "not nearly equal!")
    };
    (@go [$abs:expr, $rel:expr] $a:expr, $b:expr, $($fmt:tt)+) => {{
        let (a, b) = (&$a, &$b);
        let tol = $crate::Tolerances { abs: $abs, rel: $rel };
        if let Err(e) = $crate::CheckClose::check_close(a, b, tol) {
            panic!(
                "{} (tolerances: rel={}, abs={})\n left: {:?}\nright: {:?}\n{}",
                format!($($fmt)+), tol.rel, tol.abs, a, b, e,
            );
        }
    }};
    ($($rest:tt)+) => {
        $crate::assert_close!(@go [0.0, $crate::DEFAULT_NONZERO_TOL] $($rest)+)
    };
}

#[macro_export]
macro_rules! debug_assert_close {
    ($($t:tt)*) => {{
        #[cfg(debug_assertions)] {
            $crate::assert_close!{$($t)*}
        }
    }};
}

/// Absolute and relative tolerances.
#[derive(Debug, Copy, Clone)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Tolerances {
    pub fn is_close(&self, a: f64, b: f64) -> bool
    {
        assert!(self.rel >= 0.0 && self.abs >= 0.0, "negative tolerance");
        if a == b {
            return true; // includes same-signed infinities
        }
        if a.is_infinite() || b.is_infinite() {
            return false;
        }
        (a - b).abs() < self.abs.max(self.rel * a.abs()).max(self.rel * b.abs())
    }
}

#[derive(Debug, Fail)]
pub struct CheckCloseError {
    pub values: (f64, f64),
    pub index: Vec<usize>,
    pub tol: Tolerances,
}

impl fmt::Display for CheckCloseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (left, right) = self.values;
        write!(f, "failed at index {:?}:\n  left: {:?}\n right: {:?}", self.index, left, right)
    }
}

impl CheckCloseError {
    fn at(mut self, i: usize) -> Self {
        self.index.insert(0, i);
        self
    }
}

pub trait CheckClose<Rhs: ?Sized = Self> {
    /// Test that all values of self and other are close.
    fn check_close(&self, other: &Rhs, tol: Tolerances) -> Result<(), CheckCloseError>;
}

impl CheckClose for f64 {
    fn check_close(&self, other: &f64, tol: Tolerances) -> Result<(), CheckCloseError>
    {
        match tol.is_close(*self, *other) {
            true => Ok(()),
            false => Err(CheckCloseError { values: (*self, *other), index: vec![], tol }),
        }
    }
}

impl<'a, T: ?Sized + CheckClose> CheckClose for &'a T {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    { T::check_close(*self, *other, tol) }
}

impl<T: CheckClose> CheckClose for [T] {
    fn check_close(&self, other: &[T], tol: Tolerances) -> Result<(), CheckCloseError>
    {
        assert_eq!(self.len(), other.len(), "length mismatch in check_close");
        for (i, (a, b)) in self.iter().zip(other).enumerate() {
            a.check_close(b, tol).map_err(|e| e.at(i))?;
        }
        Ok(())
    }
}

impl<T: CheckClose> CheckClose for Vec<T> {
    fn check_close(&self, other: &Vec<T>, tol: Tolerances) -> Result<(), CheckCloseError>
    { self[..].check_close(&other[..], tol) }
}

impl<T: CheckClose> CheckClose<[T]> for Vec<T> {
    fn check_close(&self, other: &[T], tol: Tolerances) -> Result<(), CheckCloseError>
    { self[..].check_close(other, tol) }
}

impl<T: CheckClose> CheckClose for [T; 3] {
    fn check_close(&self, other: &[T; 3], tol: Tolerances) -> Result<(), CheckCloseError>
    { self[..].check_close(&other[..], tol) }
}

impl CheckClose for V3 {
    fn check_close(&self, other: &V3, tol: Tolerances) -> Result<(), CheckCloseError>
    { self.0.check_close(&other.0, tol) }
}

impl CheckClose for M33 {
    fn check_close(&self, other: &M33, tol: Tolerances) -> Result<(), CheckCloseError>
    { self.0.check_close(&other.0, tol) }
}
