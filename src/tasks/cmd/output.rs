/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use failure::ResultExt;

use isomode_modes::{DecompositionReport, ModeBasis};
use isomode_tasks_config::OutputFormat;

pub(crate) fn format_report(report: &DecompositionReport, format: OutputFormat) -> FailResult<String>
{Ok({
    match format {
        OutputFormat::Table => report.to_string(),
        OutputFormat::Yaml => serde_yaml::to_string(report)?,
        OutputFormat::Json => serde_json::to_string_pretty(report)? + "\n",
    }
})}

pub(crate) fn format_basis(basis: &ModeBasis, format: OutputFormat) -> FailResult<String>
{Ok({
    match format {
        OutputFormat::Table => basis_table(basis)?,
        OutputFormat::Yaml => serde_yaml::to_string(basis.orbits())?,
        OutputFormat::Json => serde_json::to_string_pretty(basis.orbits())? + "\n",
    }
})}

fn basis_table(basis: &ModeBasis) -> Result<String, std::fmt::Error>
{
    let mut s = String::new();
    write!(s, "Parent space group {}", basis.space_group())?;
    if let Some(n) = basis.subgroup() {
        write!(s, ", subgroup {}", n)?;
    }
    writeln!(s, ": {} modes over {} sites", basis.len(), basis.num_sites())?;

    for orbit in basis.orbits() {
        writeln!(s)?;
        writeln!(s, "Orbit {} (sites {:?})", orbit.orbit, orbit.sites)?;
        for block in &orbit.blocks {
            writeln!(s, "  {} (dimension {}, {} copies)", block.irrep, block.irrep_dimension, block.copies())?;
            for (i, vector) in block.vectors.iter().enumerate() {
                write!(s, "    {:>3}:", i)?;
                for u in vector {
                    write!(s, "  [{:>8.5} {:>8.5} {:>8.5}]", u[0], u[1], u[2])?;
                }
                writeln!(s)?;
            }
        }
    }
    Ok(s)
}

/// Write to a file, or to stdout.
pub(crate) fn emit(text: &str, path: Option<&Path>) -> FailResult<()>
{Ok({
    match path {
        Some(path) => {
            std::fs::write(path, text).with_context(|e| format!("{}: {}", path.display(), e))?;
            info!("wrote {}", path.display());
        },
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(text.as_bytes())?;
            lock.flush()?;
        },
    }
})}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use isomode_array_types::V3;
    use isomode_structure::{CellTransformation, OrbitId};
    use isomode_modes::{OrbitBasis, IrrepBlock, OrbitSplit};

    fn basis() -> ModeBasis {
        let orbit = OrbitBasis {
            orbit: OrbitId::new("Ti1"),
            sites: vec![0],
            blocks: vec![IrrepBlock {
                irrep: "GM4-".into(),
                irrep_dimension: 3,
                vectors: vec![
                    vec![V3([1.0, 0.0, 0.0])],
                    vec![V3([0.0, 1.0, 0.0])],
                    vec![V3([0.0, 0.0, 1.0])],
                ],
            }],
            split: OrbitSplit { parent: OrbitId::new("Ti1"), suborbits: vec![vec![0]] },
        };
        ModeBasis::new(221, None, CellTransformation::identity(), 1, vec![Arc::new(orbit)])
    }

    #[test]
    fn table() {
        let text = format_basis(&basis(), OutputFormat::Table).unwrap();
        assert!(text.starts_with("Parent space group 221: 3 modes over 1 sites\n"));
        assert!(text.contains("Orbit Ti1 (sites [0])"));
        assert!(text.contains("  GM4- (dimension 3, 1 copies)"));
        assert!(text.contains("      2:  [ 0.00000  0.00000  1.00000]"));
    }

    #[test]
    fn structured() {
        let json: serde_json::Value = serde_json::from_str(&format_basis(&basis(), OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[0]["blocks"][0]["irrep"], "GM4-");
        assert_eq!(json[0]["blocks"][0]["irrep-dimension"], 3);

        let yaml = format_basis(&basis(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("irrep: GM4-"));
    }
}
