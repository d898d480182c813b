/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Cubic perovskite SrTiO3 in Pm-3m, with the operations of m-3m and
//! its irreps at Γ and R.

#![allow(dead_code)]

use isomode_array_types::V3;
use isomode_structure::{Structure, Site, Lattice, OrbitId, CellTransformation, supercell};
use isomode_modes::{
    SymmetryTables, GroupTable, OperationEntry, IrrepEntry, CharacterForm, KPoint,
    TableProvider, Parent, Settings,
};

pub const A: f64 = 3.905;
pub const PM3M: u32 = 221;

/// Sr at the origin, Ti at the body center, O at the face centers.
///
/// The oxygens are in the order apical (z), then x, then y.
pub fn perovskite() -> Structure
{
    let site = |frac: [f64; 3], species: &str| Site::new(V3(frac), species, OrbitId::new(species));
    Structure::new(Lattice::cubic(A), vec![
        site([0.0, 0.0, 0.0], "Sr"),
        site([0.5, 0.5, 0.5], "Ti"),
        site([0.5, 0.5, 0.0], "O"),
        site([0.5, 0.0, 0.5], "O"),
        site([0.0, 0.5, 0.5], "O"),
    ]).unwrap()
}

fn permutations() -> Vec<[usize; 3]>
{ vec![[0, 1, 2], [1, 2, 0], [2, 0, 1], [1, 0, 2], [0, 2, 1], [2, 1, 0]] }

/// The 48 signed permutation matrices, identity first.
pub fn m3m_rotations() -> Vec<[[i32; 3]; 3]>
{
    let mut out = vec![];
    for p in permutations() {
        for &sx in &[1, -1] {
            for &sy in &[1, -1] {
                for &sz in &[1, -1] {
                    let signs = [sx, sy, sz];
                    let mut m = [[0; 3]; 3];
                    for row in 0..3 {
                        m[row][p[row]] = signs[row];
                    }
                    out.push(m);
                }
            }
        }
    }
    out
}

fn det(m: &[[i32; 3]; 3]) -> i32
{
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Class of the proper part of a rotation, as an index into [E, 8C3, 3C2, 6C4, 6C2'].
fn class_of(m: &[[i32; 3]; 3]) -> usize
{
    let d = det(m);
    let proper: Vec<Vec<i32>> = m.iter().map(|row| row.iter().map(|x| d * x).collect()).collect();
    let trace = proper[0][0] + proper[1][1] + proper[2][2];
    let diagonal = (0..3).all(|i| (0..3).all(|j| i == j || proper[i][j] == 0));
    match (trace, diagonal) {
        (3, _) => 0,
        (0, _) => 1,
        (-1, true) => 2,
        (1, _) => 3,
        (-1, false) => 4,
        _ => panic!("not a cubic rotation: {:?}", m),
    }
}

/// Characters of the irreps of 432 over its classes.
const O_CHARACTERS: &[(&str, [f64; 5])] = &[
    ("1", [1.0, 1.0, 1.0, 1.0, 1.0]),
    ("2", [1.0, 1.0, 1.0, -1.0, -1.0]),
    ("3", [2.0, -1.0, 2.0, 0.0, 0.0]),
    ("4", [3.0, 0.0, -1.0, 1.0, -1.0]),
    ("5", [3.0, 0.0, -1.0, -1.0, 1.0]),
];

/// The ten irreps of m-3m, labeled `<prefix><n><parity>`, over `m3m_rotations`.
pub fn m3m_irreps(prefix: &str) -> Vec<(String, Vec<f64>)>
{
    let rotations = m3m_rotations();
    let mut out = vec![];
    for &(parity, sign) in &[("+", 1.0), ("-", -1.0)] {
        for &(n, chars) in O_CHARACTERS {
            let characters = rotations.iter()
                .map(|m| {
                    let inversion = if det(m) < 0 { sign } else { 1.0 };
                    chars[class_of(m)] * inversion
                })
                .collect();
            out.push((format!("{}{}{}", prefix, n, parity), characters));
        }
    }
    out
}

pub fn r_point() -> KPoint
{ KPoint::new("R", [0.5, 0.5, 0.5]) }

pub fn tables() -> SymmetryTables
{
    let mut irreps = vec![];
    for &(prefix, k_point) in &[("GM", "GM"), ("R", "R")] {
        for (label, characters) in m3m_irreps(prefix) {
            irreps.push(IrrepEntry {
                label,
                k_point: k_point.to_string(),
                k: None,
                characters,
                kind: Default::default(),
                form: CharacterForm::Parent,
            });
        }
    }

    SymmetryTables {
        groups: vec![GroupTable {
            number: PM3M,
            operations: m3m_rotations().into_iter()
                .map(|rotation| OperationEntry { rotation, translation: [0.0; 3] })
                .collect(),
            irreps,
            correspondences: vec![],
        }],
    }
}

pub fn provider() -> TableProvider
{ TableProvider::new(tables()) }

/// The parent, with orbits assigned.
pub fn parent(k_points: &[KPoint], settings: &Settings) -> Parent
{
    Parent::from_provider(&provider(), perovskite(), PM3M, k_points).unwrap()
        .with_assigned_orbits(settings).unwrap()
}

/// Out-of-phase rotation of the octahedra about z (a0a0c-), as Cartesian
/// displacements of the sites of `supercell::build(perovskite(), cell)`.
///
/// Each of the two moving oxygens of a parent cell moves by `delta`.
pub fn octahedral_rotation(cell: &CellTransformation, delta: f64) -> Vec<V3>
{
    let token = supercell::build(&perovskite(), cell).1;
    (0..token.num_cells() * token.num_parent_sites()).map(|i| {
        let t = token.translation(i);
        let sign = match (t[0] + t[1] + t[2]).rem_euclid(2) {
            0 => 1.0,
            _ => -1.0,
        };
        match token.parent_site(i) {
            3 => V3([sign * delta, 0.0, 0.0]),
            4 => V3([0.0, -sign * delta, 0.0]),
            _ => V3::zero(),
        }
    }).collect()
}
