/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use serde::Serialize;

use isomode_array_types::V3;
use isomode_structure::{Structure, CellTransformation, MinimumImage, Permute, find_perm, supercell};

use crate::{FailResult, Settings, AmbiguousImages, StructureMismatch};
use crate::linalg::flatten;

/// Cartesian displacement of every site of a working cell.
#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionVector {
    displacements: Vec<V3>,
}

impl DistortionVector {
    pub fn new(displacements: Vec<V3>) -> Self
    { DistortionVector { displacements } }

    pub fn zero(num_sites: usize) -> Self
    { DistortionVector::new(vec![V3::zero(); num_sites]) }

    pub fn displacements(&self) -> &[V3]
    { &self.displacements }

    pub fn num_sites(&self) -> usize
    { self.displacements.len() }

    pub fn norm(&self) -> f64
    { self.displacements.iter().map(|u| u.sqnorm()).sum::<f64>().sqrt() }

    /// The displacements as a single `3N` vector.
    pub fn flat(&self) -> Vec<f64>
    { flatten(&self.displacements) }

    /// Displace the sites of a structure.
    pub fn apply_to(&self, structure: &Structure) -> FailResult<Structure>
    {Ok({
        ensure!(structure.num_sites() == self.num_sites(),
            "cannot displace {} sites by a field over {}", structure.num_sites(), self.num_sites());
        let lattice = structure.lattice();
        let fracs = structure.fracs().into_iter().zip(&self.displacements)
            .map(|(x, u)| x + u / lattice)
            .collect();
        structure.with_fracs(fracs)?.reduced()
    })}
}

impl Permute for DistortionVector {
    fn permuted_by(self, perm: &isomode_structure::Perm) -> Self
    { DistortionVector::new(self.displacements.permuted_by(perm)) }
}

/// Computes the displacement field between a reference and a distorted structure.
pub struct DisplacementExtractor<'a> {
    settings: &'a Settings,
}

impl<'a> DisplacementExtractor<'a> {
    pub fn new(settings: &'a Settings) -> Self
    { DisplacementExtractor { settings } }

    /// The undistorted parent, expanded into the working cell.
    pub fn reference(&self, parent: &Structure, cell: &CellTransformation) -> Structure
    { supercell::build(parent, cell).0 }

    /// Expand the parent and compare the distorted structure against it.
    pub fn extract(
        &self,
        parent: &Structure,
        distorted: &Structure,
        cell: &CellTransformation,
    ) -> FailResult<(Structure, DistortionVector)>
    {Ok({
        let reference = self.reference(parent, cell);
        let field = self.extract_from_reference(&reference, distorted)?;
        (reference, field)
    })}

    /// Displacements of the distorted sites from the reference sites.
    ///
    /// Distorted fractional coordinates are interpreted in the reference
    /// lattice; strain of the distorted lattice is not part of the field.
    pub fn extract_from_reference(&self, reference: &Structure, distorted: &Structure) -> FailResult<DistortionVector>
    {Ok({
        let settings = self.settings;
        if reference.num_sites() != distorted.num_sites() {
            throw!(StructureMismatch::SiteCount {
                reference: reference.num_sites(),
                distorted: distorted.num_sites(),
            });
        }

        let distorted = match settings.match_sites {
            true => {
                let perm = find_perm::match_sites(reference, distorted, settings.match_distance)
                    .map_err(|cause| StructureMismatch::Unmatched { cause })?;
                distorted.clone().permuted_by(&perm)
            },
            false => distorted.clone(),
        };

        let finder = MinimumImage::new(reference.lattice());
        let mut displacements = Vec::with_capacity(reference.num_sites());
        for (site, (r, d)) in reference.sites().iter().zip(distorted.sites()).enumerate() {
            if r.species() != d.species() {
                throw!(StructureMismatch::Species {
                    site,
                    expected: r.species().to_string(),
                    found: d.species().to_string(),
                });
            }

            let diff = d.frac() - r.frac();
            let image = match settings.ambiguous_images {
                AmbiguousImages::Error => {
                    finder.nearest(diff, settings.ambiguity_tol)
                        .map_err(|e| StructureMismatch::AmbiguousImage {
                            site,
                            count: e.count,
                            distance: e.distance,
                        })?
                },
                AmbiguousImages::LowestShift => finder.nearest_lowest_shift(diff, settings.ambiguity_tol),
            };
            displacements.push(image.cart);
        }

        let field = DistortionVector::new(displacements);
        debug!("displacement norm {:.6} over {} sites", field.norm(), field.num_sites());
        field
    })}
}
