/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use isomode_array_types::V3;

use crate::Lattice;

/// A helper type for locating minimum images under periodic boundary conditions.
///
/// Differences are first reduced by rounding their fractional coordinates,
/// after which the 27 images around the origin are searched.  This is exact
/// for cells of modest skew.
#[derive(Debug, Clone)]
pub struct MinimumImage {
    lattice: Lattice,
    // always in lexicographic order
    shifts: Vec<V3<i32>>,
}

/// One periodic image of a difference vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Lattice translation (in fractional units) added to the input difference.
    pub shift: V3<i32>,
    pub frac: V3,
    pub cart: V3,
    pub distance: f64,
}

/// Two or more images are equally short.
#[derive(Debug, Fail)]
#[fail(display = "{} periodic images lie within {:e} of the shortest distance {}", count, tol, distance)]
pub struct AmbiguousImage {
    pub distance: f64,
    pub count: usize,
    pub tol: f64,
    pub shifts: Vec<V3<i32>>,
}

impl MinimumImage {
    pub fn new(lattice: &Lattice) -> Self {
        let mut shifts = Vec::with_capacity(27);
        for &a in &[-1, 0, 1] {
            for &b in &[-1, 0, 1] {
                for &c in &[-1, 0, 1] {
                    shifts.push(V3([a, b, c]));
                }
            }
        }
        MinimumImage { lattice: lattice.clone(), shifts }
    }

    pub fn lattice(&self) -> &Lattice
    { &self.lattice }

    /// All images whose length is within `tol` (units of length) of the shortest,
    /// in lexicographic order of their shifts.
    pub fn shortest_images(&self, frac_diff: V3, tol: f64) -> Vec<Image>
    {
        let base = frac_diff.map(|x| -x.round());
        let reduced = frac_diff + base;
        let base = base.map(|x| x as i32);

        let images: Vec<Image> = self.shifts.iter().map(|&s| {
            let frac = reduced + s.map(f64::from);
            let cart = frac * &self.lattice;
            Image { shift: base + s, frac, cart, distance: cart.norm() }
        }).collect();

        let minimum = images.iter().map(|im| im.distance).fold(std::f64::INFINITY, f64::min);
        images.into_iter().filter(|im| im.distance <= minimum + tol).collect()
    }

    /// The unique shortest image.
    ///
    /// Fails if another image is within `tol` of the shortest.
    pub fn nearest(&self, frac_diff: V3, tol: f64) -> Result<Image, AmbiguousImage>
    {
        let mut images = self.shortest_images(frac_diff, tol);
        match images.len() {
            1 => Ok(images.remove(0)),
            count => Err(AmbiguousImage {
                distance: images.iter().map(|im| im.distance).fold(std::f64::INFINITY, f64::min),
                count,
                tol,
                shifts: images.into_iter().map(|im| im.shift).collect(),
            }),
        }
    }

    /// The shortest image, breaking ties within `tol` by choosing the
    /// lexicographically lowest shift.
    pub fn nearest_lowest_shift(&self, frac_diff: V3, tol: f64) -> Image
    {
        let mut images = self.shortest_images(frac_diff, tol);
        if images.len() > 1 {
            trace!("breaking a {}-way tie between periodic images", images.len());
        }
        // never empty; the minimum is always within tolerance of itself
        images.swap_remove(0)
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn shortest_images() {
        let lattice = Lattice::diagonal(&[4.0, 8.0, 12.0]);
        let finder = MinimumImage::new(&lattice);
        let tol = 1e-5;

        // a reduced point
        let quarter_way = V3([0.25, -0.25, 0.25]);
        let image = finder.nearest(quarter_way, tol).unwrap();
        assert_eq!(image.shift, V3([0, 0, 0]));
        assert_close!(abs=1e-12, image.cart, V3([1.0, -2.0, 3.0]));

        // far away images of it
        let image = finder.nearest(quarter_way + V3([3.0, -2.0, 7.0]), tol).unwrap();
        assert_eq!(image.shift, V3([-3, 2, -7]));
        assert_close!(abs=1e-12, image.cart, V3([1.0, -2.0, 3.0]));

        // a point with many ties.
        let approx_center = V3([0.5 - 1e-8, -0.5 - 1e-7, 0.5]);
        let images = finder.shortest_images(approx_center, tol);
        assert_eq!(images.len(), 8);
        for im in &images {
            assert_close!(abs=2e-5, im.distance, (approx_center * &lattice).norm());
        }
        let err = finder.nearest(approx_center, tol).unwrap_err();
        assert_eq!(err.count, 8);
    }

    #[test]
    fn ties_are_broken_deterministically() {
        let lattice = Lattice::cubic(2.0);
        let finder = MinimumImage::new(&lattice);
        let half = V3([0.5, 0.0, 0.0]);
        let chosen = finder.nearest_lowest_shift(half, 1e-8);
        // candidates are +0.5 (shift 0) and -0.5 (shift -1)
        assert_eq!(chosen.shift, V3([-1, 0, 0]));
        assert_eq!(finder.nearest_lowest_shift(-half, 1e-8).shift, V3([0, 0, 0]));
    }
}
