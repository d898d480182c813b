/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

// NOTE: Please make sure to use the YamlRead trait when deserializing these types!

use serde::de;

use std::path::PathBuf;

pub use isomode_modes::Settings as Tolerances;
pub use isomode_modes::{KPoint, OperationEntry, AmbiguousImages, SymmetryTables};

pub const MAX_VERSION: u32 = 1;

/// Root settings object.
///
/// This is what you should deserialize.
#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSettings(pub Settings);

/// Raw deserialized form of settings.
///
/// You shouldn't deserialize this type directly; deserialize `ValidatedSettings` instead,
/// so that additional validation and filling of defaults can be performed.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Identifies the version of the settings that this file uses.
    ///
    /// If not specified, assumes a value of 1.
    #[serde(default)]
    pub version: Option<u32>,

    pub parent: Parent,

    /// POSCAR of the distorted structure.
    ///
    /// Only required for a decomposition.
    #[serde(default)]
    pub distorted: Option<PathBuf>,

    pub symmetry: Symmetry,

    /// The working cell in terms of the parent cell.
    ///
    /// When absent, it is derived by comparing the distorted structure to the
    /// parent (or taken to be the parent cell if there is no distorted structure).
    #[serde(default)]
    pub cell: Option<Cell>,

    /// Restricts the mode basis to the displacements invariant under a subgroup.
    #[serde(default)]
    pub subgroup: Option<Subgroup>,

    #[serde(default)]
    pub tolerances: Tolerances,

    #[serde(default)]
    pub output: Output,
}
derive_yaml_read!{ValidatedSettings}

impl<'de> de::Deserialize<'de> for ValidatedSettings {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cereal: Settings = de::Deserialize::deserialize(deserializer)?;

        cereal.validate().map_err(de::Error::custom)
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Parent {
    /// POSCAR of the high-symmetry structure.
    pub structure: PathBuf,
    /// Its space group number, in the setting of `symmetry`.
    pub space_group: u32,
}

/// Where the operations and irreps of the parent group come from.
///
/// Exactly one of `tables` and `isotropy` must be given.
///
/// # Example:
///
/// ```yaml
/// symmetry:
///   isotropy: {}
///   k-points:
///     - { label: GM, vector: [0, 0, 0] }
///     - { label: R, vector: [0.5, 0.5, 0.5] }
/// ```
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Symmetry {
    /// A YAML file of symmetry tables.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<PathBuf>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isotropy: Option<Isotropy>,

    /// The k-points whose irreps make up the basis.  Defaults to Γ.
    #[serde(default = "symmetry__k_points")]
    pub k_points: Vec<KPoint>,
}
fn symmetry__k_points() -> Vec<KPoint> { vec![KPoint::gamma()] }

// the file named by `symmetry.tables`
derive_yaml_read!{SymmetryTables}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Isotropy {
    /// Directory holding the `iso` executable and its data files.
    /// Defaults to `$ISOLOCATION`.
    #[serde(default)]
    pub location: Option<PathBuf>,

    /// Arguments of `SETTING` commands sent at startup.
    /// Defaults to `[INTERNATIONAL]`.
    #[serde(default)]
    pub settings: Vec<String>,
}

/// `x_parent = x_working P + o`.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Cell {
    pub matrix: [[i32; 3]; 3],
    #[serde(default)]
    pub origin: [f64; 3],
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Subgroup {
    /// Space group number of the subgroup, for the report and for looking
    /// up Wyckoff correspondences.
    #[serde(default)]
    pub number: Option<u32>,

    /// The operations of the subgroup, in the fractional coordinates of the
    /// working cell.
    pub operations: Vec<OperationEntry>,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Output {
    /// Leave out irreps whose total amplitude does not exceed `amplitude-cutoff`.
    #[serde(default = "output__nonzero_only")]
    pub nonzero_only: bool,

    #[serde(default = "output__amplitude_cutoff")]
    pub amplitude_cutoff: f64,

    #[serde(default)]
    pub format: OutputFormat,
}
fn output__nonzero_only() -> bool { true }
fn output__amplitude_cutoff() -> f64 { 1e-4 }

#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    Yaml,
    Json,
}

// --------------------------------------------------------

impl Default for OutputFormat {
    fn default() -> Self { OutputFormat::Table }
}

impl Default for Output {
    fn default() -> Self { from_empty_mapping().unwrap() }
}

#[test]
fn test_defaults()
{
    // NOTE: This simply checks that `from_empty_mapping` can succeed
    //       for each type that uses it.
    let _ = Output::default();
}

fn from_empty_mapping<T: for<'de> serde::Deserialize<'de>>() -> serde_yaml::Result<T> {
    use serde_yaml::{from_value, Value, Mapping};
    from_value(Value::Mapping(Mapping::new()))
}
