/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use isomode_array_types::V3;

use crate::{Structure, Site, CellTransformation};
use crate::util::reduce_frac_v3;

/// Expand a parent structure into the working cell of a `CellTransformation`.
///
/// Each parent site is replicated once for every coset translation.  The
/// output is ordered parent-site-major (all images of site 0, then all images
/// of site 1, ...), with images in the order of
/// [`CellTransformation::coset_translations`].  Species and orbit ids are
/// inherited from the parent site.
pub fn build(parent: &Structure, cell: &CellTransformation) -> (Structure, SupercellToken)
{
    let translations = cell.coset_translations();
    let lattice = cell.working_lattice(parent.lattice());

    let mut sites = Vec::with_capacity(parent.num_sites() * translations.len());
    let mut images = Vec::with_capacity(sites.capacity());
    for (index, site) in parent.sites().iter().enumerate() {
        for &t in &translations {
            let parent_frac = site.frac() + t.map(f64::from);
            let frac = reduce_frac_v3(&cell.from_parent_frac(&parent_frac));
            sites.push(Site::new(frac, site.species(), site.orbit().clone()));
            images.push((index, t));
        }
    }

    // the working lattice is an integer combination of a valid lattice
    // with nonzero determinant, so it is never degenerate
    let structure = Structure::from_parts_unchecked(lattice, sites);
    let token = SupercellToken { cell: cell.clone(), num_parent_sites: parent.num_sites(), images };
    (structure, token)
}

/// Contains enough information to relate sites of an expanded structure
/// back to the parent structure.
#[derive(Debug, Clone)]
pub struct SupercellToken {
    cell: CellTransformation,
    num_parent_sites: usize,
    images: Vec<(usize, V3<i32>)>,
}

impl SupercellToken {
    pub fn num_cells(&self) -> usize
    { self.cell.volume_ratio() }

    pub fn num_parent_sites(&self) -> usize
    { self.num_parent_sites }

    /// The parent site that a working-cell site is an image of.
    pub fn parent_site(&self, index: usize) -> usize
    { self.images[index].0 }

    /// The parent lattice translation that produced a working-cell site.
    pub fn translation(&self, index: usize) -> V3<i32>
    { self.images[index].1 }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::{Lattice, OrbitId};
    use isomode_array_types::mat;

    fn perovskite() -> Structure {
        let site = |x: [f64; 3], sp: &str, orbit: &str| Site::new(V3(x), sp, OrbitId::new(orbit));
        Structure::new(Lattice::cubic(4.0), vec![
            site([0.0, 0.0, 0.0], "Sr", "Sr1"),
            site([0.5, 0.5, 0.5], "Ti", "Ti1"),
            site([0.5, 0.5, 0.0], "O", "O1"),
            site([0.5, 0.0, 0.5], "O", "O1"),
            site([0.0, 0.5, 0.5], "O", "O1"),
        ]).unwrap()
    }

    #[test]
    fn diagonal_supercell() {
        let cell = CellTransformation::diagonal([2, 2, 2]).unwrap();
        let (sc, token) = build(&perovskite(), &cell);
        assert_eq!(sc.num_sites(), 40);
        assert_close!(abs=1e-10, sc.volume(), 8.0 * 64.0);
        assert_eq!(token.parent_site(9), 1);
        assert_eq!(token.translation(9), V3([0, 0, 1]));
        assert_close!(abs=1e-12, sc.site(9).frac(), V3([0.25, 0.25, 0.75]));
        assert_eq!(sc.sites_in_orbit(&OrbitId::new("O1")).len(), 24);
    }

    #[test]
    fn shifted_skew_supercell() {
        let m = mat::from_array([[1, 1, 0], [-1, 1, 0], [0, 0, 1]]);
        let cell = CellTransformation::new(&m, V3([0.5, 0.5, 0.5])).unwrap();
        let (sc, _) = build(&perovskite(), &cell);
        assert_eq!(sc.num_sites(), 10);
        for site in sc.sites() {
            assert!(site.frac().0.iter().all(|&x| 0.0 <= x && x < 1.0));
        }
        // Ti sits at the working origin
        let ti = sc.sites().iter().position(|s| s.species() == "Ti").unwrap();
        assert_close!(abs=1e-12, sc.site(ti).frac(), V3([0.0, 0.0, 0.0]));
    }
}
