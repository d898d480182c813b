/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! The user-facing result of a decomposition.

use std::fmt;

use serde::Serialize;

use crate::{FailResult, ModeBasis, AmplitudeResult, Method, HighResidual};
use crate::orbits::OrbitCorrespondence;

/// Amplitudes of a decomposition, with totals per irrep and per orbit.
///
/// Two normalizations are reported.  `amplitude` is the norm of the
/// displacement over the working cell.  `parent-normalized` rescales it by
/// `√(V_parent / V_working)`, so that amplitudes of different supercells of
/// one distortion are comparable.
#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct DecompositionReport {
    pub space_group: u32,
    pub subgroup: Option<u32>,
    pub cell: CellSummary,
    pub method: Method,
    pub total_norm: f64,
    pub residual: f64,
    pub warnings: Vec<HighResidual>,
    pub irreps: Vec<IrrepAmplitude>,
    pub modes: Vec<ModeAmplitude>,
    pub correspondence: OrbitCorrespondence,
}

#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CellSummary {
    pub matrix: [[i32; 3]; 3],
    pub origin: [f64; 3],
}

#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ModeAmplitude {
    pub orbit: String,
    pub irrep: String,
    pub component: usize,
    pub amplitude: f64,
    pub parent_normalized: f64,
}

#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct IrrepAmplitude {
    pub irrep: String,
    pub amplitude: f64,
    pub parent_normalized: f64,
    pub orbits: Vec<OrbitAmplitude>,
}

#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct OrbitAmplitude {
    pub orbit: String,
    pub num_modes: usize,
    pub amplitude: f64,
    pub parent_normalized: f64,
}

fn root_sum_square<'a>(xs: impl IntoIterator<Item=&'a f64>) -> f64
{ xs.into_iter().map(|x| x * x).sum::<f64>().sqrt() }

impl DecompositionReport {
    pub fn new(basis: &ModeBasis, result: &AmplitudeResult) -> FailResult<Self>
    {Ok({
        ensure!(
            basis.len() == result.amplitudes.len(),
            "{} amplitudes were given for a basis of {} modes",
            result.amplitudes.len(), basis.len()
        );
        let scale = (1.0 / basis.cell().volume_ratio() as f64).sqrt();

        let modes: Vec<ModeAmplitude> = basis.modes().zip(&result.amplitudes)
            .map(|(mode, &amplitude)| ModeAmplitude {
                orbit: mode.orbit.to_string(),
                irrep: mode.irrep.to_string(),
                component: mode.component,
                amplitude,
                parent_normalized: amplitude * scale,
            }).collect();

        let irreps = basis.irrep_labels().into_iter().map(|irrep| {
            let of_irrep: Vec<&ModeAmplitude> = modes.iter().filter(|m| m.irrep == irrep).collect();

            let mut orbits: Vec<OrbitAmplitude> = vec![];
            for mode in &of_irrep {
                match orbits.iter_mut().find(|o| o.orbit == mode.orbit) {
                    Some(o) => {
                        o.num_modes += 1;
                        o.amplitude = o.amplitude.hypot(mode.amplitude);
                    },
                    None => orbits.push(OrbitAmplitude {
                        orbit: mode.orbit.clone(),
                        num_modes: 1,
                        amplitude: mode.amplitude.abs(),
                        parent_normalized: 0.0,
                    }),
                }
            }
            for o in &mut orbits {
                o.parent_normalized = o.amplitude * scale;
            }

            let amplitude = root_sum_square(of_irrep.iter().map(|m| &m.amplitude));
            IrrepAmplitude {
                irrep: irrep.to_string(),
                amplitude,
                parent_normalized: amplitude * scale,
                orbits,
            }
        }).collect();

        let cell = basis.cell();
        DecompositionReport {
            space_group: basis.space_group(),
            subgroup: basis.subgroup(),
            cell: CellSummary {
                matrix: (*cell.matrix()).into_array(),
                origin: cell.origin().0,
            },
            method: result.method,
            total_norm: result.total_norm,
            residual: result.residual,
            warnings: result.warning.iter().cloned().collect(),
            irreps,
            modes,
            correspondence: basis.correspondence(),
        }
    })}

    /// Total amplitude of an irrep, if it has any modes.
    pub fn irrep_amplitude(&self, irrep: &str) -> Option<f64>
    { self.irreps.iter().find(|i| i.irrep == irrep).map(|i| i.amplitude) }

    /// Keep only the irreps whose total amplitude exceeds `cutoff`
    /// (and their modes).
    pub fn nonzero(&self, cutoff: f64) -> DecompositionReport
    {
        let irreps: Vec<IrrepAmplitude> = self.irreps.iter()
            .filter(|i| i.amplitude > cutoff)
            .cloned().collect();
        let modes = self.modes.iter()
            .filter(|m| irreps.iter().any(|i| i.irrep == m.irrep))
            .cloned().collect();
        DecompositionReport { irreps, modes, ..self.clone() }
    }
}

impl fmt::Display for DecompositionReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "Parent space group {}", self.space_group)?;
        if let Some(n) = self.subgroup {
            write!(f, ", subgroup {}", n)?;
        }
        writeln!(f)?;
        let m = &self.cell.matrix;
        writeln!(f, "Cell: {:?} {:?} {:?}, origin {:?}", m[0], m[1], m[2], self.cell.origin)?;
        writeln!(f)?;

        writeln!(f, "{:<12} {:<10} {:>6} {:>12} {:>12}", "Irrep", "Orbit", "Modes", "As", "Ap")?;
        for irrep in &self.irreps {
            let num_modes: usize = irrep.orbits.iter().map(|o| o.num_modes).sum();
            writeln!(f, "{:<12} {:<10} {:>6} {:>12.5} {:>12.5}",
                irrep.irrep, "(all)", num_modes, irrep.amplitude, irrep.parent_normalized)?;
            for orbit in &irrep.orbits {
                writeln!(f, "{:<12} {:<10} {:>6} {:>12.5} {:>12.5}",
                    "", orbit.orbit, orbit.num_modes, orbit.amplitude, orbit.parent_normalized)?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Total norm: {:.5}   Residual: {:.5}   ({:?})", self.total_norm, self.residual, self.method)?;
        for warning in &self.warnings {
            writeln!(f, "Warning: {}", warning)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use isomode_array_types::V3;
    use isomode_structure::{CellTransformation, OrbitId};
    use crate::{OrbitBasis, IrrepBlock};
    use crate::orbits::OrbitSplit;

    fn two_orbit_basis() -> ModeBasis {
        let orbit = |name: &str, site: usize| OrbitBasis {
            orbit: OrbitId::new(name),
            sites: vec![site],
            blocks: vec![
                IrrepBlock { irrep: "T1u".into(), irrep_dimension: 3, vectors: vec![
                    vec![V3([1.0, 0.0, 0.0])], vec![V3([0.0, 1.0, 0.0])], vec![V3([0.0, 0.0, 1.0])],
                ]},
            ],
            split: OrbitSplit { parent: OrbitId::new(name), suborbits: vec![vec![site]] },
        };
        let cell = CellTransformation::diagonal([2, 1, 1]).unwrap();
        ModeBasis::new(221, None, cell, 2, vec![Arc::new(orbit("Sr1", 0)), Arc::new(orbit("Ti1", 1))])
    }

    fn result(amplitudes: Vec<f64>) -> AmplitudeResult {
        let total_norm = amplitudes.iter().map(|a| a * a).sum::<f64>().sqrt();
        AmplitudeResult { amplitudes, residual: 0.0, total_norm, method: Method::Projection, warning: None }
    }

    #[test]
    fn totals_are_root_sum_squares() {
        let report = DecompositionReport::new(&two_orbit_basis(), &result(vec![0.3, 0.0, 0.4, 0.0, 1.2, 0.0])).unwrap();

        assert_eq!(report.irreps.len(), 1);
        let irrep = &report.irreps[0];
        assert_close!(abs=1e-12, irrep.amplitude, 1.3);
        assert_close!(abs=1e-12, irrep.parent_normalized, 1.3 / 2.0f64.sqrt());
        assert_eq!(irrep.orbits.len(), 2);
        assert_close!(abs=1e-12, irrep.orbits[0].amplitude, 0.5);
        assert_close!(abs=1e-12, irrep.orbits[1].amplitude, 1.2);
        assert_eq!(report.modes[4].orbit, "Ti1");
        assert_eq!(report.modes[4].component, 1);
        assert_eq!(report.irrep_amplitude("T1u"), Some(irrep.amplitude));
        assert_eq!(report.irrep_amplitude("T2u"), None);
    }

    #[test]
    fn nonzero_drops_small_irreps() {
        let report = DecompositionReport::new(&two_orbit_basis(), &result(vec![0.0; 6])).unwrap();
        let filtered = report.nonzero(1e-4);
        assert!(filtered.irreps.is_empty());
        assert!(filtered.modes.is_empty());
        assert_eq!(filtered.total_norm, report.total_norm);

        let text = report.to_string();
        assert!(text.contains("T1u"));
        assert!(text.contains("Sr1"));
    }

    #[test]
    fn amplitude_count_must_match_the_basis() {
        let err = DecompositionReport::new(&two_orbit_basis(), &result(vec![0.1; 5])).unwrap_err();
        assert!(err.to_string().contains("5 amplitudes"), "{}", err);
    }

    #[test]
    fn report_serializes_with_kebab_case_keys() {
        let report = DecompositionReport::new(&two_orbit_basis(), &result(vec![0.1; 6])).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["space-group"], 221);
        assert_eq!(json["cell"]["matrix"][0][0], 2);
        assert_eq!(json["irreps"][0]["orbits"][1]["orbit"], "Ti1");
        assert!(json["modes"][0]["parent-normalized"].is_number());
    }
}
