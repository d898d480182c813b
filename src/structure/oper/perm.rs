/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

/// Represents a reordering operation on sites.
///
/// `perm[i]` is the index of the element that moves into position `i`
/// when permuting (`x.permuted_by(&perm)[i] == x[perm[i]]`).  For a
/// permutation that describes a symmetry operation, this is to say that
/// the operation sends site `i` to the position of site `perm[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Perm(Vec<u32>);

#[derive(Debug, Fail)]
#[fail(display = "not a permutation: {:?}", _0)]
pub struct InvalidPerm(pub Vec<u32>);

impl Perm {
    pub fn eye(n: u32) -> Perm
    { Perm((0..n).collect()) }

    pub fn len(&self) -> usize
    { self.0.len() }

    pub fn is_empty(&self) -> bool
    { self.0.is_empty() }

    /// This performs O(n log n) validation on the data
    /// to verify that it satisfies the invariants of Perm.
    pub fn from_vec(vec: Vec<u32>) -> Result<Perm, InvalidPerm>
    {
        if !Self::validate_perm(&vec) {
            return Err(InvalidPerm(vec));
        }
        Ok(Perm(vec))
    }

    fn validate_perm(xs: &[u32]) -> bool
    {
        let mut vec = xs.to_vec();
        vec.sort();
        vec.into_iter().eq(0..xs.len() as u32)
    }

    #[cfg(test)]
    pub fn random(n: u32) -> Perm
    {
        use rand::Rng;

        let mut perm: Vec<_> = (0..n).collect();
        rand::thread_rng().shuffle(&mut perm);
        Perm(perm)
    }

    pub fn into_vec(self) -> Vec<u32>
    { self.0 }

    /// Index that position `i` is taken from.
    pub fn get(&self, i: usize) -> usize
    { self.0[i] as usize }

    pub fn inverted(&self) -> Perm
    {
        let mut out = vec![0; self.0.len()];
        for (i, &p) in self.0.iter().enumerate() {
            out[p as usize] = i as u32;
        }
        Perm(out)
    }

    /// Flipped group operator.
    ///
    /// `a.then(b) == b.of(a)`.  The flipped order is more aligned
    /// with this library's generally row-centric design.
    ///
    /// More naturally,
    /// `x.permuted_by(a).permuted_by(b) == x.permuted_by(a.then(b))`.
    pub fn then(&self, other: &Perm) -> Perm
    { self.clone().permuted_by(other) }

    /// Conventional group operator.
    pub fn of(&self, other: &Perm) -> Perm
    { other.then(self) }
}

/// Decompose a sequence into (sorted, perm).
///
/// The output will satisfy `original.permuted_by(&perm) == sorted`.
pub fn argsort<T: PartialOrd>(xs: &[T]) -> Perm
{
    let mut idx: Vec<u32> = (0..xs.len() as u32).collect();
    // NaN-like incomparable elements keep their relative order
    idx.sort_by(|&a, &b| {
        xs[a as usize].partial_cmp(&xs[b as usize]).unwrap_or(std::cmp::Ordering::Equal)
    });
    Perm(idx)
}

pub trait Permute: Sized {
    // awkward name, but it makes it makes two things clear
    // beyond a shadow of a doubt:
    // - The receiver gets permuted, not the argument.
    //   (relevant when Self is Perm)
    // - The permutation is not in-place.
    fn permuted_by(self, perm: &Perm) -> Self;
}

impl<T> Permute for Vec<T> {
    fn permuted_by(self, perm: &Perm) -> Vec<T>
    {
        assert_eq!(self.len(), perm.0.len(),
            "Incorrect permutation length: {} vs {}",
            self.len(), perm.0.len());

        let mut slots: Vec<Option<T>> = self.into_iter().map(Some).collect();
        perm.0.iter()
            .map(|&from| slots[from as usize].take().expect("(BUG) Perm invariant violated"))
            .collect()
    }
}

impl Permute for Perm {
    fn permuted_by(self, perm: &Perm) -> Perm
    { Perm(self.0.permuted_by(perm)) }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn perm_inverse()
    {
        let perm = Perm::random(20);
        let inv = perm.inverted();

        assert_eq!(perm.clone().permuted_by(&inv), Perm::eye(20));
        assert_eq!(inv.permuted_by(&perm), Perm::eye(20));
    }

    #[test]
    fn invalid_perms_are_rejected() {
        assert!(Perm::from_vec(vec![0, 1, 3, 3]).is_err());
        assert!(Perm::from_vec(vec![1, 2, 3]).is_err());
        assert!(Perm::from_vec(vec![2, 0, 1]).is_ok());
    }

    #[test]
    #[should_panic(expected = "permutation length")]
    fn incompatible_lengths() {
        let _ = vec![4, 2, 1].permuted_by(&Perm::eye(2));
    }

    #[test]
    fn argsort_sorts() {
        let xs = vec![3.0, 1.0, 2.0];
        let perm = argsort(&xs);
        assert_eq!(xs.permuted_by(&perm), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn permute_associativity()
    {
        let xy = Perm::from_vec(vec![1, 0, 2]).unwrap();
        let zx = Perm::from_vec(vec![2, 1, 0]).unwrap();
        let xyzx = Perm::from_vec(vec![2, 0, 1]).unwrap();
        assert_eq!(xy.then(&zx), xyzx);
        assert_eq!(zx.of(&xy), xyzx);
        assert_eq!(
            vec![0, 1, 2].permuted_by(&xy).permuted_by(&zx),
            vec![0, 1, 2].permuted_by(&xyzx));
    }
}
