/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Fixtures shared by the unit tests: the point group mmm (D2h).

use isomode_array_types::V3;
use isomode_structure::{Structure, Site, Lattice, OrbitId, SymmetryOperation};

use crate::Irrep;

/// The eight sign matrices, ordered by the signs of (x, y, z) with `+`
/// before `-`, slowest on x.
pub(crate) fn mmm_signs() -> Vec<[i32; 3]>
{
    let mut out = vec![];
    for &a in &[1, -1] {
        for &b in &[1, -1] {
            for &c in &[1, -1] {
                out.push([a, b, c]);
            }
        }
    }
    out
}

pub(crate) fn mmm_operations() -> Vec<SymmetryOperation>
{
    mmm_signs().into_iter()
        .map(|[a, b, c]| SymmetryOperation::from(&[[a, 0, 0], [0, b, 0], [0, 0, c]]))
        .collect()
}

/// The eight one-dimensional irreps at `k`; irrep `p` (read as three bits,
/// slowest on x) has character `s_x^p_x s_y^p_y s_z^p_z`.
pub(crate) fn mmm_irreps(k: V3) -> Vec<Irrep>
{
    (0..8).map(|p| {
        let parity = [(p >> 2) & 1, (p >> 1) & 1, p & 1];
        let chars = mmm_signs().into_iter().map(|s| {
            (0..3).map(|i| if parity[i] == 1 { f64::from(s[i]) } else { 1.0 }).product::<f64>()
        }).collect();
        Irrep::at_k(format!("K{}{}{}", parity[0], parity[1], parity[2]), k, chars)
    }).collect()
}

/// One site "A" at the origin and a general orbit "B" of eight sites.
pub(crate) fn general_orbit_structure() -> Structure
{
    let mut sites = vec![Site::new(V3([0.0; 3]), "A", OrbitId::new("A1"))];
    for op in mmm_operations() {
        let frac = op.transform_frac(&V3([0.1, 0.2, 0.3])).map(|x| x - x.floor());
        sites.push(Site::new(frac, "B", OrbitId::new("B1")));
    }
    Structure::new(Lattice::orthorhombic(3.0, 4.0, 5.0), sites).unwrap()
}
