/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::collections::HashMap;
use std::hash::Hash;

use isomode_array_types::M33;

use crate::SymmetryOperation;

// NOTE: There is no "group" trait.  Many groups depend on some form of
//       context (a tolerance, a lattice), which is awkward to work into
//       a trait but trivial to add to a closure.

/// Tree representation of a finite group, with generators as leaves.
pub struct GroupTree<G> {
    members: Vec<G>,
    decomps: Vec<Option<(usize, usize)>>,
}

impl<G> GroupTree<G>
{
    /// Constructs a `GroupTree<G>` given a sequence that contains
    /// each member of a finite group exactly once.
    ///
    /// A `GroupTree<G>` constructed in this manner is guaranteed to
    /// order its elements in the same order as the input `Vec`.
    ///
    /// In line with the library's predominantly row-centric design,
    /// `compose(a, b)` should perform *`a` followed by `b`*.
    pub fn from_all_members(
        members: Vec<G>,
        mut compose: impl FnMut(&G, &G) -> G,
    ) -> Self
    where G: Hash + Eq + Clone,
    {
        // we cannot construct the identity without any generators
        assert!(members.len() > 0, "empty groups do not exist!");

        let indices: HashMap<G, usize> =
            members.iter().cloned()
            .enumerate().map(|(i, x)| (x, i))
            .collect();

        // Brute force O(G^2) attempt to fill the tree.
        let mut decomps = vec![None; members.len()];
        for a in 0..members.len() {
            for b in 0..=a {
                let c = indices[&compose(&members[a], &members[b])];
                if c > a {
                    decomps[c] = Some((a, b));
                }
            }
        }
        GroupTree { members, decomps }
    }

    pub fn len(&self) -> usize
    { self.members.len() }

    /// Indices of the members that must be computed directly
    /// by `compute_homomorphism`.
    pub fn generator_indices(&self) -> Vec<usize>
    { (0..self.len()).filter(|&i| self.decomps[i].is_none()).collect() }

    /// Compute a homomorphism of a group using the tree
    /// to elide expensive computations.
    ///
    /// Ideally, `compute` should be a function that is very expensive to
    /// compute, while `compose` should be comparatively cheaper.
    ///
    /// `compose(a, b)` should compute *`a` followed by `b`*.
    pub fn compute_homomorphism<H>(
        &self,
        mut compute: impl FnMut(usize, &G) -> H,
        mut compose: impl FnMut(&H, &H) -> H,
    ) -> Vec<H>
    {
        let result = self.try_compute_homomorphism(
            |idx, g| Ok::<_, std::convert::Infallible>(compute(idx, g)),
            |a, b| Ok(compose(a, b)),
        );
        match result {
            Ok(out) => out,
            Err(never) => match never {},
        }
    }

    /// `compute_homomorphism` for fallible functions.
    pub fn try_compute_homomorphism<E, H>(
        &self,
        mut compute: impl FnMut(usize, &G) -> Result<H, E>,
        mut compose: impl FnMut(&H, &H) -> Result<H, E>,
    ) -> Result<Vec<H>, E>
    {Ok({
        let len = self.members.len();
        let mut out = Vec::with_capacity(len);

        for (index, g, decomp) in izip!(0..len, &self.members, &self.decomps) {
            let value = match *decomp {
                None => compute(index, g)?,
                Some((a, b)) => compose(&out[a], &out[b])?,
            };
            out.push(value);
        }
        out
    })}
}

//---------------------------------------------------------------------

/// Multiplication table of a finite group of symmetry operations
/// (modulo lattice translations).
///
/// `product(a, b)` is the index of *`a` followed by `b`*.
#[derive(Debug, Clone)]
pub struct CayleyTable {
    len: usize,
    table: Vec<usize>,
    identity: usize,
    inverses: Vec<usize>,
}

#[derive(Debug, Fail)]
pub enum GroupError {
    #[fail(display = "the group contains no operations")]
    Empty,
    #[fail(display = "no identity operation")]
    MissingIdentity,
    #[fail(display = "operations {} and {} are equal modulo lattice translations", _0, _1)]
    Duplicate(usize, usize),
    #[fail(display = "not closed under composition: operation {} followed by {} is not in the group", _0, _1)]
    NotClosed(usize, usize),
}

impl CayleyTable {
    /// Build the table for a list of operations, comparing translations
    /// modulo 1 with an absolute tolerance.
    pub fn of_operations(ops: &[SymmetryOperation], tol: f64) -> Result<CayleyTable, GroupError>
    {Ok({
        if ops.is_empty() {
            return Err(GroupError::Empty);
        }
        let index = OperationIndex::new(ops, tol);
        for (i, op) in ops.iter().enumerate() {
            match index.locate(op) {
                Some(j) if j != i => return Err(GroupError::Duplicate(j.min(i), j.max(i))),
                _ => {},
            }
        }

        let identity = index.locate(&SymmetryOperation::eye()).ok_or(GroupError::MissingIdentity)?;

        let len = ops.len();
        let mut table = Vec::with_capacity(len * len);
        for (a, op_a) in ops.iter().enumerate() {
            for (b, op_b) in ops.iter().enumerate() {
                let c = index.locate(&op_a.then(op_b)).ok_or(GroupError::NotClosed(a, b))?;
                table.push(c);
            }
        }

        // each element needs some b with a.then(b) == identity
        let mut inverses = vec![usize::max_value(); len];
        for a in 0..len {
            for b in 0..len {
                if table[a * len + b] == identity {
                    inverses[a] = b;
                }
            }
        }
        if let Some(a) = inverses.iter().position(|&b| b == usize::max_value()) {
            return Err(GroupError::NotClosed(a, a));
        }

        trace!("built a {0}x{0} cayley table", len);
        CayleyTable { len, table, identity, inverses }
    })}

    pub fn len(&self) -> usize
    { self.len }

    pub fn identity(&self) -> usize
    { self.identity }

    /// Index of *`a` followed by `b`*.
    #[inline]
    pub fn product(&self, a: usize, b: usize) -> usize
    { self.table[a * self.len + b] }

    pub fn inverse(&self, a: usize) -> usize
    { self.inverses[a] }

    /// A group tree over the indices of the table.
    pub fn tree(&self) -> GroupTree<usize>
    { GroupTree::from_all_members((0..self.len).collect(), |&a, &b| self.product(a, b)) }
}

/// Locates operations in a list by rotation and (approximate) translation.
pub(crate) struct OperationIndex<'a> {
    ops: &'a [SymmetryOperation],
    by_rot: HashMap<M33<i32>, Vec<usize>>,
    tol: f64,
}

impl<'a> OperationIndex<'a> {
    pub(crate) fn new(ops: &'a [SymmetryOperation], tol: f64) -> Self
    {
        let mut by_rot = HashMap::new();
        for (i, op) in ops.iter().enumerate() {
            by_rot.entry(*op.rot_t()).or_insert_with(Vec::new).push(i);
        }
        OperationIndex { ops, by_rot, tol }
    }

    pub(crate) fn locate(&self, op: &SymmetryOperation) -> Option<usize>
    {
        self.by_rot.get(op.rot_t())?
            .iter().cloned()
            .find(|&i| self.ops[i].approx_eq(op, self.tol))
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use isomode_array_types::{V3, mat};

    #[test]
    fn cayley_table_of_a_nonsymmorphic_group() {
        // P2_1/c-like: 2-fold screw along b and a glide
        let screw = SymmetryOperation::new(
            &mat::from_array([[-1, 0, 0], [0, 1, 0], [0, 0, -1]]),
            V3([0.0, 0.5, 0.5]),
        ).unwrap();
        let inversion = SymmetryOperation::from(&[[-1, 0, 0], [0, -1, 0], [0, 0, -1]]);
        let ops = vec![
            SymmetryOperation::eye(),
            screw.clone(),
            inversion.clone(),
            screw.then(&inversion),
        ];
        let table = CayleyTable::of_operations(&ops, 1e-6).unwrap();
        assert_eq!(table.identity(), 0);
        assert_eq!(table.product(1, 1), 0);
        assert_eq!(table.product(1, 2), 3);
        assert_eq!(table.inverse(3), 3);

        // the tree reproduces the table
        let tree = table.tree();
        let products = tree.compute_homomorphism(|i, _| ops[i].clone(), |a, b| a.then(b));
        for (op, expected) in izip!(&products, &ops) {
            assert!(op.approx_eq(expected, 1e-12));
        }
    }

    #[test]
    fn missing_members_are_detected() {
        let screw = SymmetryOperation::new(
            &mat::from_array([[-1, 0, 0], [0, 1, 0], [0, 0, -1]]),
            V3([0.0, 0.5, 0.5]),
        ).unwrap();
        let inversion = SymmetryOperation::from(&[[-1, 0, 0], [0, -1, 0], [0, 0, -1]]);
        let ops = vec![SymmetryOperation::eye(), screw, inversion];
        match CayleyTable::of_operations(&ops, 1e-6) {
            Err(GroupError::NotClosed(1, 2)) => {},
            other => panic!("unexpected: {:?}", other.map(|t| t.len())),
        }

        let ops = vec![SymmetryOperation::from(&[[-1, 0, 0], [0, -1, 0], [0, 0, -1]])];
        match CayleyTable::of_operations(&ops, 1e-6) {
            Err(GroupError::MissingIdentity) => {},
            other => panic!("unexpected: {:?}", other.map(|t| t.len())),
        }
    }
}
