/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use isomode_array_types::V3;
use isomode_structure::{CellTransformation, OrbitId};

use crate::{FailResult, OrbitBasis};

/// Identifies an orbit basis.
///
/// Everything the basis depends on is part of the key, so parents that
/// merely share labels never share entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BasisKey {
    pub space_group: u32,
    /// Working group members of the projection subgroup.
    pub subgroup: Option<Vec<usize>>,
    pub cell: [[i32; 3]; 3],
    /// Origin in parent fractional coordinates, rounded to 1e-6.
    pub origin: [i64; 3],
    pub orbit: OrbitId,
    /// Species and reduced working-cell position of each orbit site,
    /// rounded to 1e-6.
    pub sites: Vec<(String, [i64; 3])>,
    /// Each irrep with its working group characters, rounded to 1e-6.
    pub irreps: Vec<(String, Vec<i64>)>,
}

const QUANTUM: f64 = 1e6;

fn quantize(x: f64) -> i64
{ (x * QUANTUM).round() as i64 }

// positions that differ by a lattice vector get the same key
fn quantize_frac(x: f64) -> i64
{ quantize(x).rem_euclid(QUANTUM as i64) }

impl BasisKey {
    pub fn new<'a, 'b>(
        space_group: u32,
        subgroup: Option<Vec<usize>>,
        cell: &CellTransformation,
        orbit: &OrbitId,
        sites: impl IntoIterator<Item=(&'a str, V3)>,
        irreps: impl IntoIterator<Item=(&'b str, &'b [f64])>,
    ) -> Self
    {
        let origin = cell.origin();
        let sites = sites.into_iter()
            .map(|(species, frac)| (species.to_string(), [quantize_frac(frac[0]), quantize_frac(frac[1]), quantize_frac(frac[2])]))
            .collect();
        let irreps = irreps.into_iter()
            .map(|(label, chars)| (label.to_string(), chars.iter().cloned().map(quantize).collect()))
            .collect();
        BasisKey {
            space_group,
            subgroup,
            cell: (*cell.matrix()).into_array(),
            origin: [quantize(origin[0]), quantize(origin[1]), quantize(origin[2])],
            orbit: orbit.clone(),
            sites, irreps,
        }
    }
}

/// Orbit bases shared between decompositions.
///
/// Lookups take a read lock.  A miss takes the write lock and computes the
/// entry while holding it, so each basis is built once.
#[derive(Debug, Default)]
pub struct ModeBasisCache {
    entries: RwLock<HashMap<BasisKey, Arc<OrbitBasis>>>,
}

impl ModeBasisCache {
    pub fn new() -> Self
    { Default::default() }

    pub fn get(&self, key: &BasisKey) -> Option<Arc<OrbitBasis>>
    {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub fn get_or_try_insert_with(
        &self,
        key: BasisKey,
        compute: impl FnOnce() -> FailResult<OrbitBasis>,
    ) -> FailResult<Arc<OrbitBasis>>
    {Ok({
        if let Some(basis) = self.get(&key) {
            trace!("basis cache hit: {:?}", key);
            return Ok(basis);
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // somebody may have beaten us here
        if let Some(basis) = entries.get(&key) {
            return Ok(basis.clone());
        }
        trace!("basis cache miss: {:?}", key);
        let basis = Arc::new(compute()?);
        entries.insert(key, basis.clone());
        basis
    })}

    pub fn len(&self) -> usize
    { self.entries.read().unwrap_or_else(|e| e.into_inner()).len() }

    pub fn is_empty(&self) -> bool
    { self.len() == 0 }

    pub fn clear(&self)
    { self.entries.write().unwrap_or_else(|e| e.into_inner()).clear() }
}
