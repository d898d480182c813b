/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Wyckoff orbits: labeling sites by orbit, and how orbits split in a subgroup.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use isomode_structure::{Structure, SymmetryOperation, OrbitId, Perm, MinimumImage};

use crate::{FailResult, DataInconsistency};

/// Label the sites of a structure by the orbits of a group of operations.
///
/// Sites related by an operation share a label of the form `<species><n>`,
/// numbered per species in order of first appearance.
pub fn assign_orbits(
    structure: &Structure,
    ops: &[SymmetryOperation],
    space_group: u32,
    tol: f64,
) -> FailResult<Structure>
{Ok({
    let finder = MinimumImage::new(structure.lattice());
    let sites = structure.sites();

    let image_of = |i: usize, operation: usize| -> Result<usize, DataInconsistency> {
        let moved = ops[operation].transform_frac(&sites[i].frac());
        sites.iter().position(|s| {
            s.species() == sites[i].species()
                && finder.shortest_images(s.frac() - moved, 0.0)[0].distance < tol
        }).ok_or(DataInconsistency::StructureNotSymmetric { space_group, site: i, operation })
    };

    let mut labels: Vec<Option<OrbitId>> = vec![None; sites.len()];
    let mut counts = BTreeMap::<&str, usize>::new();
    for i in 0..sites.len() {
        if labels[i].is_some() {
            continue;
        }
        let count = counts.entry(sites[i].species()).or_insert(0);
        *count += 1;
        let label = OrbitId::new(format!("{}{}", sites[i].species(), count));

        for operation in 0..ops.len() {
            let j = image_of(i, operation)?;
            match labels[j] {
                None => labels[j] = Some(label.clone()),
                Some(ref existing) if existing == &label => {},
                // a site reached from two different orbits
                Some(_) => return Err(DataInconsistency::StructureNotSymmetric { space_group, site: i, operation }.into()),
            }
        }
        trace!("orbit {}: {} sites", label, labels.iter().filter(|x| x.as_ref() == Some(&label)).count());
    }

    let labels = labels.into_iter().map(|x| x.expect("(BUG) site without orbit")).collect();
    structure.with_orbits(labels)?
})}

/// The orbits of a subgroup within one parent orbit.
///
/// `perms` are the site permutations of the subgroup members, over the
/// positions of `sites` (i.e. `perm.get(a) == b` means the operation sends
/// `sites[a]` onto `sites[b]`).  Output suborbits contain entries of `sites`,
/// each sorted, ordered by their first site.
pub fn split_orbit(sites: &[usize], perms: &[&Perm]) -> Vec<Vec<usize>>
{
    let mut suborbit_of = vec![None; sites.len()];
    let mut suborbits = vec![];
    for start in 0..sites.len() {
        if suborbit_of[start].is_some() {
            continue;
        }
        let index = suborbits.len();
        let mut members: Vec<usize> = perms.iter().map(|p| p.get(start)).collect();
        members.sort();
        members.dedup();
        for &m in &members {
            suborbit_of[m] = Some(index);
        }
        suborbits.push(members.into_iter().map(|m| sites[m]).collect());
    }
    suborbits
}

/// How each parent orbit splits into subgroup orbits.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OrbitCorrespondence {
    pub orbits: Vec<OrbitSplit>,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct OrbitSplit {
    pub parent: OrbitId,
    /// Working-cell site indices of each subgroup orbit.
    pub suborbits: Vec<Vec<usize>>,
}

impl OrbitSplit {
    fn sorted_sizes(&self) -> Vec<usize>
    {
        let mut sizes: Vec<_> = self.suborbits.iter().map(|s| s.len()).collect();
        sizes.sort();
        sizes
    }
}

impl OrbitCorrespondence {
    pub fn get(&self, parent: &OrbitId) -> Option<&OrbitSplit>
    { self.orbits.iter().find(|s| &s.parent == parent) }

    /// Check a derived split of one orbit against this correspondence.
    ///
    /// Orbits absent from the correspondence are accepted.  Otherwise the
    /// number and sizes of the suborbits must agree.
    pub fn check(&self, derived: &OrbitSplit, space_group: u32) -> Result<(), DataInconsistency>
    {
        let supplied = match self.get(&derived.parent) {
            Some(split) => split.sorted_sizes(),
            None => return Ok(()),
        };
        let derived_sizes = derived.sorted_sizes();
        if supplied != derived_sizes {
            return Err(DataInconsistency::CorrespondenceMismatch {
                space_group,
                orbit: derived.parent.clone(),
                supplied,
                derived: derived_sizes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::test_util::{mmm_operations, general_orbit_structure};
    use isomode_structure::{CayleyTable, find_perm};

    #[test]
    fn orbits_are_labeled_per_species() {
        let structure = general_orbit_structure();
        let unlabeled = structure.with_orbits(vec![OrbitId::new("?"); structure.num_sites()]).unwrap();
        let labeled = assign_orbits(&unlabeled, &mmm_operations(), 47, 1e-4).unwrap();

        let ids: Vec<_> = labeled.orbit_ids().into_iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["A1", "B1"]);
        assert_eq!(labeled.sites_in_orbit(&OrbitId::new("B1")).len(), 8);
    }

    #[test]
    fn asymmetric_structure_is_rejected() {
        let structure = general_orbit_structure();
        let mut fracs = structure.fracs();
        fracs[3][0] += 0.05;
        let broken = structure.with_fracs(fracs).unwrap();
        assert!(assign_orbits(&broken, &mmm_operations(), 47, 1e-4).is_err());
    }

    #[test]
    fn general_orbit_splits_in_a_subgroup() {
        let structure = general_orbit_structure();
        let ops = mmm_operations();
        let table = CayleyTable::of_operations(&ops, 1e-6).unwrap();
        let sites = structure.sites_in_orbit(&OrbitId::new("B1"));
        let fracs: Vec<_> = sites.iter().map(|&i| structure.site(i).frac()).collect();
        let perms = find_perm::of_group(
            structure.lattice(), &fracs, &vec![(); fracs.len()], &ops, &table, 1e-4,
        ).unwrap();

        // identity and the z-mirror
        let subgroup = vec![&perms[0], &perms[1]];
        let suborbits = split_orbit(&sites, &subgroup);
        assert_eq!(suborbits.len(), 4);
        assert!(suborbits.iter().all(|s| s.len() == 2));
        assert_eq!(suborbits.concat().len(), 8);

        let derived = OrbitSplit { parent: OrbitId::new("B1"), suborbits };
        let mut supplied = OrbitCorrespondence::default();
        supplied.orbits.push(OrbitSplit {
            parent: OrbitId::new("B1"),
            suborbits: vec![(1..9).collect()],
        });
        match supplied.check(&derived, 47) {
            Err(DataInconsistency::CorrespondenceMismatch { ref supplied, .. }) => assert_eq!(supplied, &vec![8]),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
