/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Checks performed after deserialization.

use crate::config::*;
use failure::Error;

impl Settings {
    pub fn validate(mut self) -> Result<ValidatedSettings, Error> {
        fix_version(&mut self.version)?;
        check_symmetry(&self.symmetry)?;
        check_tolerances(&self.tolerances)?;

        if let Some(cell) = &self.cell {
            check_cell(cell)?;
        }
        if let Some(subgroup) = &self.subgroup {
            if subgroup.operations.is_empty() {
                bail!("`subgroup.operations` must list at least the identity.");
            }
        }
        if !(self.output.amplitude_cutoff >= 0.0) {
            bail!("`output.amplitude-cutoff: {}` must be non-negative.", self.output.amplitude_cutoff);
        }

        Ok(ValidatedSettings(self))
    }
}

fn fix_version(it: &mut Option<u32>) -> Result<(), Error> {
    match *it {
        Some(x) if x == 0 || x > MAX_VERSION => {
            bail!("`version: {}` is invalid. (1 <= version <= {})", x, MAX_VERSION);
        },
        None => {
            warn!("\
                Settings file has no `version` field! Assuming `version: 1`. \
                (the latest is version {})\
            ", MAX_VERSION);
            *it = Some(1);
        },
        _ => {},
    };

    Ok(())
}

fn check_symmetry(symmetry: &Symmetry) -> Result<(), Error> {
    match (&symmetry.tables, &symmetry.isotropy) {
        (Some(_), Some(_)) => bail!("`symmetry.tables` and `symmetry.isotropy` cannot both be given."),
        (None, None) => bail!("One of `symmetry.tables` or `symmetry.isotropy` is required."),
        _ => {},
    }
    if symmetry.k_points.is_empty() {
        bail!("`symmetry.k-points` must not be empty.");
    }
    Ok(())
}

fn check_tolerances(tol: &Tolerances) -> Result<(), Error> {
    let positive = [
        ("position-tol", tol.position_tol),
        ("symmetry-tol", tol.symmetry_tol),
        ("rank-tol", tol.rank_tol),
        ("multiplicity-tol", tol.multiplicity_tol),
        ("orthonormality-tol", tol.orthonormality_tol),
        ("ambiguity-tol", tol.ambiguity_tol),
        ("residual-warning-fraction", tol.residual_warning_fraction),
        ("match-distance", tol.match_distance),
        ("lattice-tol", tol.lattice_tol),
    ];
    for &(name, value) in &positive {
        // written to also reject NaN
        if !(value > 0.0) {
            bail!("`tolerances.{}: {}` must be positive.", name, value);
        }
    }
    Ok(())
}

fn check_cell(cell: &Cell) -> Result<(), Error> {
    let m = &cell.matrix;
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
    if det == 0 {
        bail!("`cell.matrix: {:?}` is singular.", m);
    }
    if det < 0 {
        warn!("`cell.matrix` is left-handed (determinant {}).", det);
    }
    Ok(())
}
