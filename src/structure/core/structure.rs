/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::fmt;

use isomode_array_types::V3;

use crate::{Lattice, DegenerateLattice};
use crate::oper::perm::{Perm, Permute};
use crate::util::reduce_frac_v3;

/// Label shared by all sites of one Wyckoff orbit.
///
/// Sites of the same orbit are related to one another by the parent
/// symmetry operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitId(String);

impl OrbitId {
    pub fn new(label: impl Into<String>) -> Self
    { OrbitId(label.into()) }

    pub fn as_str(&self) -> &str
    { &self.0 }
}

impl fmt::Display for OrbitId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    { fmt::Display::fmt(&self.0, f) }
}

impl<'a> From<&'a str> for OrbitId {
    fn from(s: &'a str) -> Self { OrbitId::new(s) }
}

/// An atom of a [`Structure`].
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    frac: V3,
    species: String,
    orbit: OrbitId,
}

impl Site {
    pub fn new(frac: V3, species: impl Into<String>, orbit: OrbitId) -> Self
    { Site { frac, species: species.into(), orbit } }

    /// Fractional position, in units of the lattice of the owning structure.
    pub fn frac(&self) -> V3 { self.frac }
    pub fn species(&self) -> &str { &self.species }
    pub fn orbit(&self) -> &OrbitId { &self.orbit }

    pub fn with_orbit(self, orbit: OrbitId) -> Site
    { Site { orbit, ..self } }

    pub fn with_frac(self, frac: V3) -> Site
    { Site { frac, ..self } }
}

/// A lattice together with an ordered list of sites.
///
/// Immutable once constructed; all "modifying" methods return a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    lattice: Lattice,
    sites: Vec<Site>,
}

#[derive(Debug, Fail)]
#[fail(display = "got {} values for {} sites", found, expected)]
pub struct SiteCountMismatch {
    pub expected: usize,
    pub found: usize,
}

impl Structure {
    /// Constructs a structure, validating the lattice.
    pub fn new(lattice: Lattice, sites: Vec<Site>) -> Result<Self, DegenerateLattice>
    {
        let lattice = Lattice::checked_new(lattice.matrix())?;
        Ok(Structure { lattice, sites })
    }

    /// For lattices that are known to be valid (e.g. derived from another structure).
    pub(crate) fn from_parts_unchecked(lattice: Lattice, sites: Vec<Site>) -> Self
    { Structure { lattice, sites } }

    pub fn lattice(&self) -> &Lattice { &self.lattice }
    pub fn sites(&self) -> &[Site] { &self.sites }
    pub fn site(&self, index: usize) -> &Site { &self.sites[index] }
    pub fn num_sites(&self) -> usize { self.sites.len() }
    pub fn volume(&self) -> f64 { self.lattice.volume() }

    pub fn fracs(&self) -> Vec<V3>
    { self.sites.iter().map(Site::frac).collect() }

    pub fn carts(&self) -> Vec<V3>
    { self.sites.iter().map(|s| s.frac * &self.lattice).collect() }

    pub fn species(&self) -> Vec<&str>
    { self.sites.iter().map(Site::species).collect() }

    /// Every distinct orbit id, in order of first appearance.
    pub fn orbit_ids(&self) -> Vec<OrbitId>
    {
        let mut out: Vec<OrbitId> = vec![];
        for site in &self.sites {
            if !out.contains(&site.orbit) {
                out.push(site.orbit.clone());
            }
        }
        out
    }

    /// Indices of the sites in an orbit, in increasing order.
    pub fn sites_in_orbit(&self, orbit: &OrbitId) -> Vec<usize>
    {
        self.sites.iter().enumerate()
            .filter(|(_, s)| &s.orbit == orbit)
            .map(|(i, _)| i)
            .collect()
    }

    /// Reduce all positions into the unit cell `[0, 1)`.
    pub fn reduced(self) -> Structure
    {
        let Structure { lattice, sites } = self;
        let sites = sites.into_iter().map(|s| {
            let frac = reduce_frac_v3(&s.frac);
            s.with_frac(frac)
        }).collect();
        Structure { lattice, sites }
    }

    /// Replace the fractional positions of every site.
    pub fn with_fracs(&self, fracs: Vec<V3>) -> Result<Structure, SiteCountMismatch>
    {
        self.zip_sites(fracs, Site::with_frac)
    }

    /// Relabel the orbit of every site.
    pub fn with_orbits(&self, orbits: Vec<OrbitId>) -> Result<Structure, SiteCountMismatch>
    {
        self.zip_sites(orbits, Site::with_orbit)
    }

    fn zip_sites<T>(&self, values: Vec<T>, f: impl Fn(Site, T) -> Site) -> Result<Structure, SiteCountMismatch>
    {
        if values.len() != self.sites.len() {
            return Err(SiteCountMismatch { expected: self.sites.len(), found: values.len() });
        }
        let sites = self.sites.iter().cloned().zip(values).map(|(s, v)| f(s, v)).collect();
        Ok(Structure { lattice: self.lattice.clone(), sites })
    }
}

impl Permute for Structure {
    fn permuted_by(self, perm: &Perm) -> Structure
    {
        let Structure { lattice, sites } = self;
        Structure { lattice, sites: sites.permuted_by(perm) }
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    fn two_site_structure() -> Structure {
        Structure::new(Lattice::cubic(2.0), vec![
            Site::new(V3([0.0, 0.0, 0.0]), "Sr", "Sr1".into()),
            Site::new(V3([1.25, -0.5, 0.5]), "O", "O1".into()),
        ]).unwrap()
    }

    #[test]
    fn accessors() {
        let s = two_site_structure();
        assert_eq!(s.species(), vec!["Sr", "O"]);
        assert_eq!(s.carts()[1], V3([2.5, -1.0, 1.0]));
        assert_eq!(s.orbit_ids(), vec![OrbitId::new("Sr1"), OrbitId::new("O1")]);
        assert_eq!(s.sites_in_orbit(&"O1".into()), vec![1]);
        assert_eq!(s.clone().reduced().site(1).frac(), V3([0.25, 0.5, 0.5]));
    }

    #[test]
    fn relabeling_checks_length() {
        let s = two_site_structure();
        assert!(s.with_orbits(vec![OrbitId::new("X")]).is_err());
        let relabeled = s.with_orbits(vec!["A".into(), "A".into()]).unwrap();
        assert_eq!(relabeled.sites_in_orbit(&"A".into()), vec![0, 1]);
    }

    #[test]
    fn permutation_moves_sites() {
        let s = two_site_structure().permuted_by(&Perm::from_vec(vec![1, 0]).unwrap());
        assert_eq!(s.species(), vec!["O", "Sr"]);
    }
}
