/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use serde::{Serialize, Deserialize};

use isomode_array_types::V3;

/// A k-point of the parent Brillouin zone, in units of the parent
/// reciprocal lattice.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct KPoint {
    pub label: String,
    pub vector: [f64; 3],
}

impl KPoint {
    pub fn new(label: impl Into<String>, vector: [f64; 3]) -> Self
    { KPoint { label: label.into(), vector } }

    pub fn gamma() -> Self
    { KPoint::new("GM", [0.0; 3]) }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IrrepKind {
    /// A real irrep.
    Real,
    /// A complex irrep summed with its conjugate.
    ///
    /// The characters are those of the (real, reducible) sum, so the
    /// projector onto it carries an extra factor of 1/2.
    ComplexPair,
}

impl Default for IrrepKind {
    fn default() -> Self { IrrepKind::Real }
}

impl IrrepKind {
    pub(crate) fn projector_factor(self) -> f64 {
        match self {
            IrrepKind::Real => 1.0,
            IrrepKind::ComplexPair => 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Characters {
    /// One character per member of the working group, in its order.
    Working(Vec<f64>),
    /// Characters of the parent operations at a single-arm k-point.
    ///
    /// The character of `{E|τ}{R|t}` is `cos(2π k·τ) χ(R|t)`.
    KVector { k: V3, parent: Vec<f64> },
}

/// An (physically) irreducible representation, identified by its characters.
#[derive(Debug, Clone, PartialEq)]
pub struct Irrep {
    pub label: String,
    pub characters: Characters,
    pub kind: IrrepKind,
}

impl Irrep {
    /// An irrep at a k-point, from the characters of the parent operations.
    pub fn at_k(label: impl Into<String>, k: V3, parent: Vec<f64>) -> Self {
        Irrep {
            label: label.into(),
            characters: Characters::KVector { k, parent },
            kind: IrrepKind::Real,
        }
    }

    /// An irrep at Γ, from the characters of the parent operations.
    pub fn at_gamma(label: impl Into<String>, parent: Vec<f64>) -> Self
    { Irrep::at_k(label, V3::zero(), parent) }

    /// An irrep with explicit characters for every working group member.
    pub fn working(label: impl Into<String>, characters: Vec<f64>) -> Self {
        Irrep {
            label: label.into(),
            characters: Characters::Working(characters),
            kind: IrrepKind::Real,
        }
    }

    pub fn with_kind(self, kind: IrrepKind) -> Self
    { Irrep { kind, ..self } }

    pub fn label(&self) -> &str
    { &self.label }
}
