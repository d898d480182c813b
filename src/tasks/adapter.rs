/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;

use std::path::Path;

use isomode_structure::{Structure, CellTransformation};
use isomode_structure_io::Poscar;
use isomode_modes::{StructureAdapter, Settings, derive_cell_transformation};

/// Reads structures from POSCAR files.
#[derive(Debug, Clone)]
pub struct PoscarAdapter {
    settings: Settings,
}

impl PoscarAdapter {
    pub fn new(settings: Settings) -> Self
    { PoscarAdapter { settings } }
}

impl StructureAdapter for PoscarAdapter {
    fn load(&self, path: &Path) -> FailResult<Structure>
    { Ok(Poscar::load(path)?.structure) }

    fn cell_transformation(&self, parent: &Structure, distorted: &Structure) -> FailResult<CellTransformation>
    {Ok({
        let cell = derive_cell_transformation(parent, distorted, &self.settings)?;
        info!("derived cell: {:?}, origin {:?}", cell.matrix(), cell.origin());
        cell
    })}
}
