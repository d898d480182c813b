/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Site permutations induced by symmetry operations, and site matching.

use ordered_float::{NotNan, FloatIsNan};
use failure::Backtrace;

use isomode_array_types::V3;

use crate::{Lattice, Structure, SymmetryOperation, CayleyTable, MinimumImage};
use crate::oper::perm::{Perm, Permute, argsort};

#[derive(Debug, Fail)]
pub enum PositionMatchError {
    #[fail(display = "positions are too dissimilar")]
    NoMatch(Backtrace),
    #[fail(display = "multiple positions mapped to the same index")]
    DuplicateMatch(Backtrace),
}

/// Compute the site permutation of a single operation.
///
/// The output `perm` satisfies `op(fracs)[i] ~ fracs[perm[i]]`;
/// i.e. the operation sends site `i` onto the position of site `perm[i]`.
/// `meta` (typically species) must be preserved by the operation.
pub fn of_operation<M: Ord>(
    lattice: &Lattice,
    fracs: &[V3],
    meta: &[M],
    op: &SymmetryOperation,
    tol: f64,
) -> Result<Perm, PositionMatchError>
{
    let to_fracs = op.transform_fracs(fracs);
    brute_force_with_sort_trick(lattice, meta, fracs, &to_fracs, tol)
}

/// Compute permutations for all members of a group of operations.
///
/// Generators of the group are found by brute force; all other members
/// are then composed from the generators' permutations.
pub fn of_group<M: Ord>(
    lattice: &Lattice,
    fracs: &[V3],
    meta: &[M],
    ops: &[SymmetryOperation],
    table: &CayleyTable,
    tol: f64,
) -> Result<Vec<Perm>, PositionMatchError>
{
    assert_eq!(ops.len(), table.len());
    let tree = table.tree();
    trace!("computing site permutations of {} operations ({} by brute force)",
        ops.len(), tree.generator_indices().len());

    tree.try_compute_homomorphism(
        // Generators: Do a (very expensive!) brute force search.
        |i, _| of_operation(lattice, fracs, meta, &ops[i], tol),
        // Other operators: Quickly compose the results from other operators.
        |a, b| Ok({
            // With this definition of perms, the perm of "a followed by b"
            // is b's perm permuted by a's.
            b.clone().permuted_by(a)
        }),
    )
}

/// Find the ordering of `target` that aligns it with `reference`.
///
/// The output satisfies `target.permuted_by(&perm)[i] ~ reference[i]`, where
/// each reference site is paired with the nearest periodic image of a target
/// site of the same species.  Target positions are interpreted in the lattice
/// of the reference.  Fails unless every pairing is unique and shorter than
/// `max_distance`.
pub fn match_sites(
    reference: &Structure,
    target: &Structure,
    max_distance: f64,
) -> Result<Perm, PositionMatchError>
{
    if reference.num_sites() != target.num_sites() {
        return Err(PositionMatchError::NoMatch(Backtrace::new()));
    }
    let finder = MinimumImage::new(reference.lattice());
    let n = reference.num_sites();

    let mut taken = vec![false; n];
    let mut perm = Vec::with_capacity(n);
    for r in reference.sites() {
        let best = target.sites().iter().enumerate()
            .filter(|(_, t)| t.species() == r.species())
            .map(|(j, t)| {
                let images = finder.shortest_images(t.frac() - r.frac(), 0.0);
                (j, images[0].distance)
            })
            .filter(|&(_, d)| d < max_distance)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        match best {
            None => return Err(PositionMatchError::NoMatch(Backtrace::new())),
            Some((j, _)) if taken[j] => return Err(PositionMatchError::DuplicateMatch(Backtrace::new())),
            Some((j, _)) => {
                taken[j] = true;
                perm.push(j as u32);
            },
        }
    }
    Perm::from_vec(perm).map_err(|_| PositionMatchError::DuplicateMatch(Backtrace::new()))
}

fn brute_force_with_sort_trick<M: Ord>(
    lattice: &Lattice,
    meta: &[M],
    from_fracs: &[V3],
    to_fracs: &[V3],
    tol: f64,
) -> Result<Perm, PositionMatchError>
{Ok({
    assert_eq!(from_fracs.len(), meta.len());
    assert_eq!(to_fracs.len(), meta.len());

    // Sort both sides by some measure which is likely to produce a small
    // maximum value of (sorted_rotated_index - sorted_original_index).
    // This reduces an O(n^2) search down to ~O(n).
    //
    // We choose to sort first by site metadata, then by distance to the nearest
    // bravais lattice point.
    let sort_by_lattice_distance = |fracs: &[V3]| -> Result<_, PositionMatchError> {
        let fracs: Vec<V3> = fracs.iter().map(|v| v - v.map(f64::round)).collect();
        let keys = fracs.iter().zip(meta)
            .map(|(x, m)| Ok((m, NotNan::new((x * lattice).norm())?)))
            .collect::<Result<Vec<_>, FloatIsNan>>()
            .map_err(|_| PositionMatchError::NoMatch(Backtrace::new()))?;
        let perm = argsort(&keys);
        let sorted_meta: Vec<&M> = (0..meta.len()).map(|i| &meta[perm.get(i)]).collect();
        Ok((perm.clone(), fracs.permuted_by(&perm), sorted_meta))
    };

    let (perm_from, sorted_from, meta_from) = sort_by_lattice_distance(from_fracs)?;
    let (perm_to, sorted_to, meta_to) = sort_by_lattice_distance(to_fracs)?;

    let perm_between = brute_force_near_identity(
        lattice,
        (&sorted_from, &meta_from),
        (&sorted_to, &meta_to),
        tol,
    )?;

    // Compose all of the permutations for the full permutation.
    //
    // Note that permutations are associative; that is,
    //     x.permute(p).permute(q) == x.permute(p.permute(q))
    perm_from
        .permuted_by(&perm_between)
        .permuted_by(&perm_to.inverted())
})}

// Optimized for permutations near the identity.
fn brute_force_near_identity<M: Eq>(
    lattice: &Lattice,
    (from_fracs, from_meta): (&[V3], &[&M]),
    (to_fracs, to_meta): (&[V3], &[&M]),
    tol: f64,
) -> Result<Perm, PositionMatchError>
{Ok({
    assert_eq!(from_fracs.len(), to_fracs.len());
    let n = from_fracs.len();

    const UNSET: u32 = u32::max_value();
    assert!(n < UNSET as usize);

    let mut perm = vec![UNSET; n];

    // Rather than filling the out vector in order, we find where each
    // index belongs, tracking the first unassigned index.
    // This works best if the permutation is close to the identity.
    let mut search_start = 0;

    'from: for from in 0..n {

        // Skip through things filled out of order.
        while search_start < n && perm[search_start] != UNSET {
            search_start += 1;
        }

        for to in search_start..n {
            if perm[to] != UNSET || from_meta[from] != to_meta[to] {
                continue;
            }

            let distance2 = {
                let diff = (from_fracs[from] - to_fracs[to]).map(|x| x - x.round());
                (diff * lattice).sqnorm()
            };
            if distance2 < tol * tol {
                perm[to] = from as u32;
                continue 'from;
            }
        }
        return Err(PositionMatchError::NoMatch(Backtrace::new()));
    }

    if perm.iter().any(|&x| x == UNSET) {
        return Err(PositionMatchError::DuplicateMatch(Backtrace::new()));
    }

    Perm::from_vec(perm).map_err(|_| PositionMatchError::DuplicateMatch(Backtrace::new()))?
})}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::{Site, OrbitId, CayleyTable};
    use isomode_array_types::Envee;

    fn random_problem(n: usize) -> (Vec<V3>, Perm, Vec<V3>)
    {
        let original: Vec<[f64; 3]> = (0..n).map(|_| ::rand::random()).collect();
        let perm = Perm::random(n as u32);
        let permuted = original.clone().permuted_by(&perm);
        (original.envee(), perm, permuted.envee())
    }

    #[test]
    fn sort_trick_recovers_random_permutations() {
        let (original, perm, permuted) = random_problem(20);
        let lattice = Lattice::orthorhombic(3.0, 4.0, 5.0);

        let output = brute_force_with_sort_trick(
            &lattice, &[(); 20], &original, &permuted, 1e-5,
        ).unwrap();

        assert_eq!(output, perm);
    }

    #[test]
    fn metadata_is_respected() {
        // two sites at the same position but of different species
        let lattice = Lattice::cubic(1.0);
        let fracs = vec![V3([0.1, 0.2, 0.3]), V3([0.1, 0.2, 0.3])];
        let swapped = vec![fracs[1], fracs[0]];
        let perm = brute_force_with_sort_trick(&lattice, &["A", "B"], &fracs, &swapped, 1e-5).unwrap();
        assert_eq!(perm, Perm::eye(2));
    }

    #[test]
    fn group_permutations_compose() {
        // mmm acting on a (x, 0, 0) pair and a general (x, y, z) orbit of 8
        let lattice = Lattice::orthorhombic(3.0, 4.0, 5.0);
        let mut ops = vec![];
        for &a in &[1, -1] {
            for &b in &[1, -1] {
                for &c in &[1, -1] {
                    ops.push(SymmetryOperation::from(&[[a, 0, 0], [0, b, 0], [0, 0, c]]));
                }
            }
        }
        let table = CayleyTable::of_operations(&ops, 1e-8).unwrap();
        let mut fracs = vec![V3([0.2, 0.0, 0.0]), V3([0.8, 0.0, 0.0])];
        for op in &ops {
            fracs.push(op.transform_frac(&V3([0.1, 0.2, 0.3])).map(|x| x - x.floor()));
        }
        let meta = vec![0, 0, 1, 1, 1, 1, 1, 1, 1, 1];

        let perms = of_group(&lattice, &fracs, &meta, &ops, &table, 1e-6).unwrap();
        for (op, perm) in izip!(&ops, &perms) {
            let brute = of_operation(&lattice, &fracs, &meta, op, 1e-6).unwrap();
            assert_eq!(perm, &brute);
        }
        // the x-mirror swaps the pair
        assert_eq!(perms[4].get(0), 1);
    }

    #[test]
    fn sites_are_matched_by_species_and_distance() {
        let site = |x: [f64; 3], sp: &str| Site::new(V3(x), sp, OrbitId::new(sp));
        let reference = Structure::new(Lattice::cubic(4.0), vec![
            site([0.0, 0.0, 0.0], "Sr"),
            site([0.5, 0.5, 0.5], "Ti"),
            site([0.5, 0.5, 0.0], "O"),
        ]).unwrap();
        let target = Structure::new(Lattice::cubic(4.0), vec![
            site([0.51, 0.49, 0.99], "O"),
            site([0.99, 0.0, 0.01], "Sr"),
            site([0.5, 0.52, 0.5], "Ti"),
        ]).unwrap();
        let perm = match_sites(&reference, &target, 0.5).unwrap();
        assert_eq!(perm.into_vec(), vec![1, 2, 0]);

        assert!(match_sites(&reference, &target, 0.01).is_err());
    }
}
