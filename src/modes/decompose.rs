/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::{FailResult, Settings, ModeBasis, DistortionVector, HighResidual};
use crate::linalg::{dot, axpy, norm};

// below this, a distortion is treated as no distortion at all
const ZERO_NORM: f64 = 1e-12;
const PARSEVAL_TOL: f64 = 1e-6;

#[derive(Serialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Dot products with an orthonormal basis.
    Projection,
    /// SVD least squares, for a basis that is not orthonormal.
    LeastSquares,
}

/// Amplitudes of a displacement field over a mode basis.
#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct AmplitudeResult {
    /// One per mode, in the order of [`ModeBasis::modes`].
    pub amplitudes: Vec<f64>,
    pub residual: f64,
    pub total_norm: f64,
    pub method: Method,
    pub warning: Option<HighResidual>,
}

pub struct ModeDecomposer<'a> {
    settings: &'a Settings,
}

impl<'a> ModeDecomposer<'a> {
    pub fn new(settings: &'a Settings) -> Self
    { ModeDecomposer { settings } }

    pub fn decompose(&self, distortion: &DistortionVector, basis: &ModeBasis) -> FailResult<AmplitudeResult>
    {Ok({
        ensure!(distortion.num_sites() == basis.num_sites(),
            "displacement field has {} sites, but the mode basis has {}",
            distortion.num_sites(), basis.num_sites());

        let u = distortion.flat();
        let modes = basis.full_vectors();
        let total_norm = norm(&u);

        let deviation = gram_deviation(&modes);
        let (method, amplitudes) = if deviation <= self.settings.orthonormality_tol {
            (Method::Projection, modes.iter().map(|m| dot(m, &u)).collect())
        } else {
            warn!("mode basis deviates from orthonormality by {:e}; using least squares", deviation);
            (Method::LeastSquares, least_squares(&modes, &u)?)
        };

        let mut fit = vec![0.0; u.len()];
        for (m, &a) in modes.iter().zip(&amplitudes) {
            axpy(a, m, &mut fit);
        }
        let mut remainder = u.clone();
        axpy(-1.0, &fit, &mut remainder);
        let residual = norm(&remainder);

        // Σ a² only equals |fit|² for an orthonormal basis
        let explained = match method {
            Method::Projection => amplitudes.iter().map(|a| a * a).sum::<f64>(),
            Method::LeastSquares => dot(&fit, &fit),
        };
        let discrepancy = (explained + residual * residual - total_norm * total_norm).abs();
        if discrepancy > PARSEVAL_TOL * f64::max(1.0, total_norm * total_norm) {
            warn!("amplitudes and residual do not add up to the distortion (off by {:e}); the basis may be broken", discrepancy);
        }

        let threshold = self.settings.residual_warning_fraction;
        let warning = match total_norm > ZERO_NORM && residual > threshold * total_norm {
            true => {
                let warning = HighResidual {
                    residual,
                    total: total_norm,
                    fraction: residual / total_norm,
                    threshold,
                };
                warn!("{}", warning);
                Some(warning)
            },
            false => None,
        };

        debug!("decomposed distortion of norm {:.6} into {} amplitudes, residual {:.3e}",
            total_norm, amplitudes.len(), residual);
        AmplitudeResult { amplitudes, residual, total_norm, method, warning }
    })}
}

/// Largest `|<mᵢ, mⱼ> - δᵢⱼ|`.
fn gram_deviation(modes: &[Vec<f64>]) -> f64
{
    let mut worst = 0.0;
    for (i, a) in modes.iter().enumerate() {
        for (j, b) in modes.iter().enumerate().skip(i) {
            let expected = if i == j { 1.0 } else { 0.0 };
            worst = f64::max(worst, (dot(a, b) - expected).abs());
        }
    }
    worst
}

fn least_squares(modes: &[Vec<f64>], u: &[f64]) -> FailResult<Vec<f64>>
{Ok({
    if modes.is_empty() {
        return Ok(vec![]);
    }
    let a = DMatrix::from_fn(u.len(), modes.len(), |r, c| modes[c][r]);
    let b = DVector::from_column_slice(u);
    let svd = a.svd(true, true);
    let x = svd.solve(&b, 1e-12)
        .map_err(|e| format_err!("least squares solve failed: {}", e))?;
    x.iter().cloned().collect()
})}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use rand::Rng;
    use isomode_array_types::V3;
    use isomode_structure::{CellTransformation, OrbitId};
    use crate::{OrbitBasis, IrrepBlock};
    use crate::orbits::OrbitSplit;

    // one site, with modes along x and y
    fn plane_basis(x: V3, y: V3) -> ModeBasis {
        let orbit = OrbitBasis {
            orbit: OrbitId::new("A1"),
            sites: vec![0],
            blocks: vec![
                IrrepBlock { irrep: "X".into(), irrep_dimension: 1, vectors: vec![vec![x]] },
                IrrepBlock { irrep: "Y".into(), irrep_dimension: 1, vectors: vec![vec![y]] },
            ],
            split: OrbitSplit { parent: OrbitId::new("A1"), suborbits: vec![vec![0]] },
        };
        ModeBasis::new(1, None, CellTransformation::identity(), 1, vec![Arc::new(orbit)])
    }

    #[test]
    fn projection_onto_an_orthonormal_basis() {
        let settings = Settings::default();
        let basis = plane_basis(V3([1.0, 0.0, 0.0]), V3([0.0, 1.0, 0.0]));
        let field = DistortionVector::new(vec![V3([0.3, -0.4, 0.0])]);

        let result = ModeDecomposer::new(&settings).decompose(&field, &basis).unwrap();
        assert_eq!(result.method, Method::Projection);
        assert_close!(abs=1e-12, result.amplitudes.clone(), vec![0.3, -0.4]);
        assert_close!(abs=1e-12, result.residual, 0.0);
        assert_close!(abs=1e-12, result.total_norm, 0.5);
        assert_eq!(result.warning, None);
    }

    #[test]
    fn unexplained_displacement_is_reported() {
        let settings = Settings::default();
        let basis = plane_basis(V3([1.0, 0.0, 0.0]), V3([0.0, 1.0, 0.0]));
        let field = DistortionVector::new(vec![V3([0.3, 0.0, 0.4])]);

        let result = ModeDecomposer::new(&settings).decompose(&field, &basis).unwrap();
        assert_close!(abs=1e-12, result.residual, 0.4);
        let warning = result.warning.expect("no warning");
        assert_close!(abs=1e-12, warning.fraction, 0.8);
    }

    #[test]
    fn skewed_basis_falls_back_to_least_squares() {
        let settings = Settings::default();
        let s = 0.5f64.sqrt();
        let basis = plane_basis(V3([1.0, 0.0, 0.0]), V3([s, s, 0.0]));
        let field = DistortionVector::new(vec![V3([0.0, 1.0, 0.0])]);

        let result = ModeDecomposer::new(&settings).decompose(&field, &basis).unwrap();
        assert_eq!(result.method, Method::LeastSquares);
        // (0, 1) = -1 (1, 0) + √2 (s, s)
        assert_close!(abs=1e-9, result.amplitudes.clone(), vec![-1.0, 2.0f64.sqrt()]);
        assert_close!(abs=1e-9, result.residual, 0.0);
    }

    #[test]
    fn zero_distortion_has_zero_amplitudes() {
        let settings = Settings::default();
        let basis = plane_basis(V3([1.0, 0.0, 0.0]), V3([0.0, 1.0, 0.0]));
        let result = ModeDecomposer::new(&settings).decompose(&DistortionVector::zero(1), &basis).unwrap();
        assert_eq!(result.amplitudes, vec![0.0, 0.0]);
        assert_eq!(result.residual, 0.0);
        assert_eq!(result.warning, None);
    }

    #[test]
    fn amplitudes_and_residual_split_the_norm() {
        let settings = Settings::default();
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let angle = 2.0 * std::f64::consts::PI * rng.gen::<f64>();
            let (sin, cos) = angle.sin_cos();
            let basis = plane_basis(V3([cos, sin, 0.0]), V3([-sin, cos, 0.0]));
            let u = V3::from_fn(|_| 2.0 * rng.gen::<f64>() - 1.0);

            let result = ModeDecomposer::new(&settings).decompose(&DistortionVector::new(vec![u]), &basis).unwrap();
            assert_eq!(result.method, Method::Projection);
            let explained: f64 = result.amplitudes.iter().map(|a| a * a).sum();
            assert_close!(abs=1e-10, explained + result.residual.powi(2), result.total_norm.powi(2));
            assert_close!(abs=1e-10, result.residual, u[2].abs());
        }
    }
}
