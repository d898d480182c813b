/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;

use std::borrow::Borrow;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use failure::ResultExt;

use isomode_array_types::V3;
use isomode_structure::{Structure, Site, Lattice, OrbitId};

use vasp_poscar as imp;

//--------------------------------------------------------------------------------------
// public API

/// A structure with the comment line of its POSCAR.
///
/// Sites read from a file are given their species as orbit id;
/// orbits are normally assigned afterwards from the symmetry operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Poscar<Comment = String, S = Structure> {
    pub comment: Comment,
    pub structure: S,
}

impl<Comment, S> Poscar<Comment, S>
where
    Comment: AsRef<str>,
    S: Borrow<Structure>,
{
    /// Writes a POSCAR to an open file.
    pub fn to_writer(&self, mut w: impl Write) -> FailResult<()>
    { dump(&mut w, self.comment.as_ref(), self.structure.borrow()) }

    pub fn save(&self, path: impl AsRef<Path>) -> FailResult<()>
    {
        let path = path.as_ref();
        let file = File::create(path).with_context(|e| format!("{}: {}", path.display(), e))?;
        self.to_writer(file).with_context(|e| format!("while writing {}: {}", path.display(), e))?;
        Ok(())
    }
}

impl Poscar {
    /// Reads a POSCAR from an open file.
    pub fn from_buf_reader(mut f: impl BufRead) -> FailResult<Self>
    { load_txt(&mut f) }

    pub fn load(path: impl AsRef<Path>) -> FailResult<Self>
    {
        let path = path.as_ref();
        let file = File::open(path).with_context(|e| format!("{}: {}", path.display(), e))?;
        let poscar = Poscar::from_buf_reader(std::io::BufReader::new(file))
            .with_context(|e| format!("while reading {}: {}", path.display(), e))?;
        debug!("read {} sites from {}", poscar.structure.num_sites(), path.display());
        Ok(poscar)
    }
}

//--------------------------------------------------------------------------------------
// implementation

// monomorphic
fn dump(
    w: &mut dyn Write,
    title: &str,
    structure: &Structure,
) -> FailResult<()>
{
    let fracs: Vec<[f64; 3]> = structure.fracs().into_iter().map(|v| v.0).collect();
    write!(w, "{}",
        imp::Builder::new()
            .comment(title)
            .lattice_vectors(&(*structure.lattice().matrix()).into_array())
            .positions(imp::Coords::Frac(fracs))
            .site_symbols(structure.sites().iter().map(|site| site.species()))
            .build()?,
    )?;
    Ok(())
}

fn load_txt(f: &mut dyn BufRead) -> FailResult<Poscar>
{
    use vasp_poscar::failure::ResultExt;
    let poscar = imp::Poscar::from_reader(f).compat()?;

    let comment = poscar.comment().to_string();
    let lattice = Lattice::from(&poscar.scaled_lattice_vectors());
    let fracs: Vec<V3> = match poscar.scaled_positions() {
        imp::Coords::Cart(p) => p.iter().map(|&c| V3(c) / &lattice).collect(),
        imp::Coords::Frac(p) => p.iter().map(|&f| V3(f)).collect(),
    };

    let group_symbols: Vec<String> = match poscar.group_symbols() {
        Some(iter) => iter.map(|s| s.to_string()).collect(),
        None => {
            // Files written before VASP 5 carry no symbols.  Programs like
            // phonopy and ASE put them in the comment instead.
            let symbols: Vec<String> = poscar.comment().split_whitespace().map(|s| s.to_string()).collect();
            ensure!(
                symbols.len() == poscar.group_counts().len(),
                "Symbols must be given either in the standard location or the POSCAR comment."
            );
            symbols
        },
    };

    let species: Vec<String> = itertools::zip_eq(poscar.group_counts(), group_symbols)
        .flat_map(|(count, symbol)| std::iter::repeat(symbol).take(count))
        .collect();
    ensure!(species.len() == fracs.len(), "{} species for {} positions", species.len(), fracs.len());

    let sites = fracs.into_iter().zip(species)
        .map(|(frac, species)| {
            let orbit = OrbitId::new(species.clone());
            Site::new(frac, species, orbit)
        })
        .collect();
    let structure = Structure::new(lattice, sites)?;
    Ok(Poscar { comment, structure })
}
