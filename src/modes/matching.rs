/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Deriving the cell transformation between a parent and a distorted structure.

use isomode_array_types::V3;
use isomode_structure::{Structure, CellTransformation, MinimumImage, Tol, supercell};

use crate::{FailResult, Settings, StructureMismatch};

/// Find `(P, o)` relating a distorted structure to its parent.
///
/// `P` is the rounded `L_distorted L_parent⁻¹`.  Rotations of the distorted
/// setting relative to the parent are not searched.  The origin is chosen
/// among the translations that carry the reference onto the first distorted
/// site (via sites of the same species), minimizing the largest displacement
/// of any site; ties keep the earliest candidate.
pub fn derive_cell_transformation(
    parent: &Structure,
    distorted: &Structure,
    settings: &Settings,
) -> FailResult<CellTransformation>
{Ok({
    let coefficients = distorted.lattice().coefficients_over(parent.lattice());
    let matrix = Tol(settings.lattice_tol).unfloat_m33(&coefficients)
        .map_err(|_| StructureMismatch::NonIntegralCell { coefficients: coefficients.into_array() })?;
    let cell = CellTransformation::new(&matrix, V3::zero())?;

    let reference = supercell::build(parent, &cell).0;
    if reference.num_sites() != distorted.num_sites() {
        throw!(StructureMismatch::SiteCount {
            reference: reference.num_sites(),
            distorted: distorted.num_sites(),
        });
    }
    if distorted.num_sites() == 0 {
        return Ok(cell);
    }

    let finder = MinimumImage::new(reference.lattice());
    let distance = |a: V3, b: V3| finder.shortest_images(a - b, 0.0)[0].distance;
    let anchor = distorted.site(0);

    let mut best: Option<(f64, V3)> = None;
    for candidate in reference.sites().iter().filter(|r| r.species() == anchor.species()) {
        let shift = anchor.frac() - candidate.frac();

        let mut worst = 0.0f64;
        for d in distorted.sites() {
            let nearest = reference.sites().iter()
                .filter(|r| r.species() == d.species())
                .map(|r| distance(d.frac() - shift, r.frac()))
                .fold(std::f64::INFINITY, f64::min);
            worst = worst.max(nearest);
            if let Some((score, _)) = best {
                if worst >= score {
                    break;
                }
            }
        }

        match best {
            Some((score, _)) if worst >= score => {},
            _ => best = Some((worst, shift)),
        }
    }

    let (score, shift) = best.ok_or_else(|| StructureMismatch::Species {
        site: 0,
        expected: "a species of the parent".to_string(),
        found: anchor.species().to_string(),
    })?;

    // d ≈ x_p P⁻¹ + shift  =  (x_p - o) P⁻¹   with   o = -shift P
    let origin = (-shift * &matrix.map(f64::from)).map(|x| x - x.floor());
    debug!("derived cell {:?} with origin {:?} (largest displacement {:.4})",
        matrix.into_array(), origin.0, score);
    cell.with_origin(origin)
})}
