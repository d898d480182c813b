/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::V3;

/// Conversions from sequences of arrays into sequences of `V3`.
pub trait Envee {
    type En;

    fn envee(self) -> Self::En;
}

/// Conversions from sequences of `V3` into sequences of arrays.
pub trait Unvee {
    type Un;

    fn unvee(self) -> Self::Un;
}

impl<X> Envee for Vec<[X; 3]> {
    type En = Vec<V3<X>>;

    #[inline]
    fn envee(self) -> Self::En
    { self.into_iter().map(V3).collect() }
}

impl<X> Unvee for Vec<V3<X>> {
    type Un = Vec<[X; 3]>;

    #[inline]
    fn unvee(self) -> Self::Un
    { self.into_iter().map(|V3(v)| v).collect() }
}

impl<'a, X> Envee for &'a [[X; 3]] {
    type En = &'a [V3<X>];

    #[inline]
    fn envee(self) -> Self::En
    {
        // `V3` is `repr(transparent)` over `[X; 3]`
        unsafe { std::slice::from_raw_parts(self.as_ptr() as *const V3<X>, self.len()) }
    }
}

impl<'a, X> Unvee for &'a [V3<X>] {
    type Un = &'a [[X; 3]];

    #[inline]
    fn unvee(self) -> Self::Un
    {
        // `V3` is `repr(transparent)` over `[X; 3]`
        unsafe { std::slice::from_raw_parts(self.as_ptr() as *const [X; 3], self.len()) }
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_casts_preserve_data() {
        let arrs = vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let vs: &[V3] = arrs[..].envee();
        assert_eq!(vs[1], V3([4.0, 5.0, 6.0]));
        assert_eq!(vs.unvee(), &arrs[..]);
        assert_eq!(arrs.clone().envee().unvee(), arrs);
    }
}
