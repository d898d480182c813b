/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;
use crate::adapter::PoscarAdapter;

use std::fs::File;
use std::path::{Path, PathBuf};

use failure::ResultExt;

use isomode_array_types::{V3, mat};
use isomode_structure::{Structure, SymmetryOperation, CellTransformation, supercell};
use isomode_structure_io::Poscar;
use isomode_isotropy::{IsotropyProvider, SessionConfig};
use isomode_modes::{
    Decomposition, DecompositionReport, ModeBasis, ModeBasisCache, Parent, Subgroup,
    StructureAdapter, SymmetryDataProvider, TableProvider,
};
use isomode_tasks_config::{self as config, YamlRead, ValidatedSettings, SymmetryTables};

mod output;

pub struct DecomposeArgs {
    pub config: PathBuf,
    /// Where to write the report.  Defaults to stdout.
    pub output: Option<PathBuf>,
    /// Write the undistorted parent in the working cell to this POSCAR.
    pub write_reference: Option<PathBuf>,
}

pub struct BasisArgs {
    pub config: PathBuf,
}

/// Decompose the distorted structure of a config file, and write the report.
pub fn run_decompose(args: &DecomposeArgs) -> FailResult<DecompositionReport>
{Ok({
    let inputs = Inputs::load(&args.config)?;
    let settings = &inputs.settings;
    let adapter = PoscarAdapter::new(settings.tolerances.clone());

    let distorted_path = match &settings.distorted {
        Some(path) => inputs.resolve(path),
        None => bail!("{}: `distorted` is required for a decomposition", args.config.display()),
    };
    let distorted = adapter.load(&distorted_path)?;

    let provider = inputs.provider()?;
    let cache = ModeBasisCache::new();
    let decomposition = Decomposition::new(&*provider, &cache, settings.tolerances.clone());
    let parent = inputs.parent(&decomposition, &adapter)?;

    let cell = match inputs.configured_cell()? {
        Some(cell) => cell,
        None => adapter.cell_transformation(parent.structure(), &distorted)?,
    };
    let subgroup = inputs.subgroup()?;

    if let Some(path) = &args.write_reference {
        let reference = supercell::build(parent.structure(), &cell).0;
        let comment = format!("reference of {}", distorted_path.display());
        Poscar { comment, structure: &reference }.save(path)?;
        info!("wrote the reference structure to {}", path.display());
    }

    let report = decomposition.run(&parent, &distorted, &cell, subgroup.as_ref())?;
    info!("total norm {:.6}, residual {:.6}", report.total_norm, report.residual);

    let shown = match settings.output.nonzero_only {
        true => report.nonzero(settings.output.amplitude_cutoff),
        false => report.clone(),
    };
    let text = output::format_report(&shown, settings.output.format)?;
    output::emit(&text, args.output.as_ref().map(|p| p.as_ref()))?;
    report
})}

/// Build the mode basis of a config file, and print its modes.
pub fn run_basis(args: &BasisArgs) -> FailResult<ModeBasis>
{Ok({
    let inputs = Inputs::load(&args.config)?;
    let settings = &inputs.settings;
    let adapter = PoscarAdapter::new(settings.tolerances.clone());

    let provider = inputs.provider()?;
    let cache = ModeBasisCache::new();
    let decomposition = Decomposition::new(&*provider, &cache, settings.tolerances.clone());
    let parent = inputs.parent(&decomposition, &adapter)?;

    let cell = match (inputs.configured_cell()?, &settings.distorted) {
        (Some(cell), _) => cell,
        (None, Some(path)) => {
            let distorted = adapter.load(&inputs.resolve(path))?;
            adapter.cell_transformation(parent.structure(), &distorted)?
        },
        (None, None) => CellTransformation::identity(),
    };
    let subgroup = inputs.subgroup()?;

    let basis = decomposition.basis(&parent, &cell, subgroup.as_ref())?;
    let text = output::format_basis(&basis, settings.output.format)?;
    output::emit(&text, None)?;
    basis
})}

//--------------------------------------------------------------------------------------

/// A config file, with relative paths taken relative to its directory.
struct Inputs {
    settings: config::Settings,
    dir: PathBuf,
}

impl Inputs {
    fn load(path: &Path) -> FailResult<Inputs>
    {Ok({
        let file = File::open(path).with_context(|e| format!("{}: {}", path.display(), e))?;
        let ValidatedSettings(settings) = ValidatedSettings::from_reader(file)
            .with_context(|e| format!("{}: {}", path.display(), e))?;
        let dir = path.parent().map(|p| p.to_owned()).unwrap_or_default();
        Inputs { settings, dir }
    })}

    fn resolve(&self, path: &Path) -> PathBuf
    { self.dir.join(path) }

    fn provider(&self) -> FailResult<Box<dyn SymmetryDataProvider>>
    {Ok({
        let symmetry = &self.settings.symmetry;
        let provider: Box<dyn SymmetryDataProvider> = match (&symmetry.tables, &symmetry.isotropy) {
            (Some(path), _) => {
                let path = self.resolve(path);
                let file = File::open(&path).with_context(|e| format!("{}: {}", path.display(), e))?;
                let tables = SymmetryTables::from_reader(file)
                    .with_context(|e| format!("{}: {}", path.display(), e))?;
                debug!("read symmetry tables of {} groups from {}", tables.groups.len(), path.display());
                Box::new(TableProvider::new(tables))
            },
            (None, Some(iso)) => {
                let config = SessionConfig {
                    location: iso.location.as_ref().map(|p| self.resolve(p)),
                    settings: iso.settings.clone(),
                };
                Box::new(IsotropyProvider::new(config))
            },
            // ruled out by validation
            (None, None) => bail!("no source of symmetry data"),
        };
        provider
    })}

    fn parent<P>(&self, decomposition: &Decomposition<'_, P>, adapter: &PoscarAdapter) -> FailResult<Parent>
    where P: SymmetryDataProvider + ?Sized,
    {Ok({
        let config::Parent { structure, space_group } = &self.settings.parent;
        let structure: Structure = adapter.load(&self.resolve(structure))?;
        decomposition.parent(structure, *space_group, &self.settings.symmetry.k_points)?
            .with_assigned_orbits(decomposition.settings())?
    })}

    fn configured_cell(&self) -> FailResult<Option<CellTransformation>>
    {Ok({
        match &self.settings.cell {
            Some(config::Cell { matrix, origin }) => Some(CellTransformation::new(&mat::from_array(*matrix), V3(*origin))?),
            None => None,
        }
    })}

    fn subgroup(&self) -> FailResult<Option<Subgroup>>
    {Ok({
        match &self.settings.subgroup {
            None => None,
            Some(config::Subgroup { number, operations }) => {
                let operations = operations.iter().enumerate()
                    .map(|(i, entry)| {
                        SymmetryOperation::new(&mat::from_array(entry.rotation), V3(entry.translation))
                            .map_err(|e| format_err!("subgroup operation {}: {}", i, e))
                    })
                    .collect::<FailResult<Vec<_>>>()?;
                Some(Subgroup { number: *number, operations })
            },
        }
    })}
}
