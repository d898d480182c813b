/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Group-theoretical data fetched through a [`Session`].
//!
//! Each query first brings the session into the `VALUE`/`SHOW` state it
//! needs, cancelling anything left over from a previous query.

use std::io::{BufRead, Write};

use failure::ResultExt;

use isomode_array_types::{V3, mat};
use isomode_structure::{SymmetryOperation, Tol};
use isomode_modes::KPoint;

use crate::FailResult;
use crate::frac::{parse_number, parse_numbers, parse_v3};
use crate::parse::{Record, Value};
use crate::session::Session;

/// With unit cubic lattice parameters, `SHOW CARTESIAN` prints the
/// rotations of the conventional basis.
pub const UNIT_LATTICE_PARAMETER: &str = "1 1 1 90 90 90";

/// An element of the parent space group, as ISOTROPY names it.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    /// The translation as printed, e.g. `["0", "0", "1/2"]`.
    pub translation: Vec<String>,
    pub operation: SymmetryOperation,
}

impl Element {
    /// The element as `VALUE ELEMENT` reads it.
    pub fn value_string(&self) -> String
    { format!("{} {}", self.name, self.translation.join(" ")) }
}

fn prepare<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    values: &[(&str, String)],
    shows: &[&str],
) -> FailResult<()>
{Ok({
    let wanted_values: Vec<String> = values.iter().map(|&(k, _)| k.to_uppercase()).collect();
    let wanted_shows: Vec<String> = shows.iter().map(|s| s.to_uppercase()).collect();

    let stale_shows: Vec<String> = {
        session.shows().filter(|s| !wanted_shows.iter().any(|w| w == s)).map(|s| s.to_string()).collect()
    };
    for item in stale_shows {
        session.cancel_show(&item)?;
    }
    let stale_values: Vec<String> = {
        session.values().filter(|&(k, _)| !wanted_values.iter().any(|w| w == k)).map(|(k, _)| k.to_string()).collect()
    };
    for key in stale_values {
        session.cancel_value(&key)?;
    }

    for &(key, ref value) in values {
        session.set_value(key, value)?;
    }
    for item in shows {
        session.show(item)?;
    }
})}

/// The elements of a space group, with their operations.
///
/// Only rotations that are integral in the conventional basis are
/// accepted, which excludes hexagonal groups.
pub fn elements<R: BufRead, W: Write>(session: &mut Session<R, W>, space_group: u32) -> FailResult<Vec<Element>>
{Ok({
    prepare(session, &[
        ("parent", space_group.to_string()),
        ("lattice parameter", UNIT_LATTICE_PARAMETER.to_string()),
    ], &["elements", "cartesian"])?;

    let records = session.display("parent")?;
    ensure!(!records.is_empty(), "ISOTROPY printed no elements for space group {}", space_group);

    let elements = records.iter().enumerate()
        .map(|(index, record)| {
            parse_element(record)
                .with_context(|_| format!("space group {}, element {}", space_group, index))
                .map_err(Into::into)
        })
        .collect::<FailResult<Vec<_>>>()?;
    trace!("space group {}: {} elements", space_group, elements.len());
    elements
})}

fn parse_element(record: &Record) -> FailResult<Element>
{Ok({
    let element = record.require("Elements")?.items();
    ensure!(element.len() == 2, "malformed element: {:?}", element);
    let name = element[0].as_text().ok_or_else(|| format_err!("malformed element name: {:?}", element[0]))?;
    let translation: Vec<String> = element[1].texts().into_iter().map(|s| s.to_string()).collect();
    ensure!(translation.len() == 3, "malformed element translation: {:?}", element[1]);

    let columns = record.require("Rotation matrix, translation")?.items();
    ensure!(columns.len() >= 4, "expected three rows and a translation, got {:?}", columns);
    let mut rotation = [[0; 3]; 3];
    for (row, value) in rotation.iter_mut().zip(&columns[..3]) {
        let numbers = parse_numbers(value)?;
        ensure!(numbers.len() == 3, "malformed rotation row: {:?}", value);
        for (x, &n) in row.iter_mut().zip(&numbers) {
            *x = Tol(1e-6).unfloat(n)
                .map_err(|_| format_err!("rotation of {} is not integral in the conventional basis", name))?;
        }
    }
    let trans = parse_v3(&columns[3])?;
    let operation = SymmetryOperation::new(&mat::from_array(rotation), V3(trans))?;

    Element { name: name.to_string(), translation, operation }
})}

/// The k-points of a space group with fixed coordinates.
///
/// k-points with free parameters (lines and planes of symmetry) are skipped.
pub fn k_points<R: BufRead, W: Write>(session: &mut Session<R, W>, space_group: u32) -> FailResult<Vec<KPoint>>
{Ok({
    prepare(session, &[("parent", space_group.to_string())], &["kpoint"])?;

    let mut out = vec![];
    for record in session.display("kpoint")? {
        let label = record.require("")?.as_text()
            .ok_or_else(|| format_err!("malformed k-point label: {:?}", record.get("")))?
            .to_string();
        match parse_v3(record.require("k vector")?) {
            Ok(vector) => out.push(KPoint::new(label, vector)),
            Err(_) => debug!("skipping k-point {} with free parameters", label),
        }
    }
    out
})}

/// Labels of the irreps at a k-point.
pub fn irrep_labels<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    space_group: u32,
    k_label: &str,
) -> FailResult<Vec<String>>
{Ok({
    prepare(session, &[
        ("parent", space_group.to_string()),
        ("kpoint", k_label.to_string()),
    ], &["irrep"])?;

    session.display("irrep")?.iter()
        .map(|record| {
            // a header with a blank in it may be split into two columns
            let value = match record.get("Irrep (ML)") {
                Some(value) => value,
                None => record.require("Irrep")?,
            };
            value.as_text()
                .map(|s| s.to_string())
                .ok_or_else(|| format_err!("malformed irrep label: {:?}", value))
        })
        .collect::<FailResult<Vec<_>>>()?
})}

/// Characters of an irrep over a list of elements.
pub fn characters<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    space_group: u32,
    k_label: &str,
    irrep: &str,
    elements: &[Element],
) -> FailResult<Vec<f64>>
{Ok({
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        prepare(session, &[
            ("parent", space_group.to_string()),
            ("kpoint", k_label.to_string()),
            ("irrep", irrep.to_string()),
            ("element", element.value_string()),
        ], &["matrix"])?;

        let records = session.display("irrep")?;
        let record = records.first()
            .ok_or_else(|| format_err!("no matrix for {} of irrep {}", element.value_string(), irrep))?;
        let character = trace(record.require("Matrix")?)
            .with_context(|_| format!("matrix of {} in irrep {}", element.value_string(), irrep))?;
        out.push(character);
    }
    out
})}

/// The trace of a representation matrix.
///
/// Accepts a single number, a list of rows, or a flat list of `n²` entries.
pub fn trace(matrix: &Value) -> FailResult<f64>
{Ok({
    let items = matrix.items();
    if let Value::Text(ref s) = *matrix {
        return parse_number(s);
    }

    if items.iter().all(|row| row.as_text().is_none()) {
        let n = items.len();
        let mut sum = 0.0;
        for (i, row) in items.iter().enumerate() {
            let row = row.items();
            ensure!(row.len() == n, "{} rows but a row of length {}", n, row.len());
            sum += parse_number(row[i].as_text().ok_or_else(|| format_err!("nested matrix entry"))?)?;
        }
        return Ok(sum);
    }

    let entries = parse_numbers(matrix)?;
    let n = (entries.len() as f64).sqrt().round() as usize;
    ensure!(n * n == entries.len(), "{} entries do not form a square matrix", entries.len());
    (0..n).map(|i| entries[i * n + i]).sum()
})}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::parse::convert;

    const STARTUP: &str = "\
Current setting is International (new ed.) with conventional basis vectors.
*
*
";

    fn prompts(n: usize) -> String
    { "*\n".repeat(n) }

    fn written(buf: &[u8]) -> Vec<String>
    { String::from_utf8(buf.to_vec()).unwrap().lines().map(|s| s.to_string()).collect() }

    #[test]
    fn elements_of_p_minus_1() {
        let transcript = format!("{}{}{}", STARTUP, prompts(5), "\
Elements   Rotation matrix, translation
(E|0,0,0)  (1,0,0) (0,1,0) (0,0,1) (0,0,0)
(I|0,0,0)  (-1,0,0) (0,-1,0) (0,0,-1) (0,0,0)

");
        let mut sent: Vec<u8> = vec![];
        {
            let mut session = Session::new(transcript.as_bytes(), &mut sent, &[]).unwrap();
            let elements = elements(&mut session, 2).unwrap();
            assert_eq!(elements.len(), 2);
            assert_eq!(elements[1].name, "I");
            assert_eq!(elements[1].value_string(), "I 0 0 0");
            assert_eq!(elements[1].operation.rot(), mat::from_array([[-1, 0, 0], [0, -1, 0], [0, 0, -1]]));
            assert!(elements[0].operation.is_identity(1e-12));
        }
        assert_eq!(&written(&sent)[2..], &[
            "VALUE PARENT 2",
            "VALUE LATTICE PARAMETER 1 1 1 90 90 90",
            "SHOW ELEMENTS",
            "SHOW CARTESIAN",
            "DISPLAY PARENT",
            "QUIT",
        ]);
    }

    #[test]
    fn non_integral_rotations_are_rejected() {
        let transcript = format!("{}{}{}", STARTUP, prompts(5), "\
Elements     Rotation matrix, translation
(C3z|0,0,0)  (-0.5,-0.866,0) (0.866,-0.5,0) (0,0,1) (0,0,0)

");
        let mut sent: Vec<u8> = vec![];
        let mut session = Session::new(transcript.as_bytes(), &mut sent, &[]).unwrap();
        assert!(elements(&mut session, 143).is_err());
    }

    #[test]
    fn characters_over_elements() {
        let transcript = format!("{}{}{}{}{}", STARTUP, prompts(6), "\
Irrep (ML)  Matrix
GM1-        1

", prompts(2), "\
Irrep (ML)  Matrix
GM1-        -1

");
        let identity = SymmetryOperation::eye();
        let inversion = SymmetryOperation::from(&[[-1, 0, 0], [0, -1, 0], [0, 0, -1]]);
        let zero = vec!["0".to_string(); 3];
        let elements = vec![
            Element { name: "E".to_string(), translation: zero.clone(), operation: identity },
            Element { name: "I".to_string(), translation: zero.clone(), operation: inversion },
        ];

        let mut sent: Vec<u8> = vec![];
        {
            let mut session = Session::new(transcript.as_bytes(), &mut sent, &[]).unwrap();
            let chars = characters(&mut session, 2, "GM", "GM1-", &elements).unwrap();
            assert_eq!(chars, vec![1.0, -1.0]);
        }
        assert_eq!(&written(&sent)[2..], &[
            "VALUE PARENT 2",
            "VALUE KPOINT GM",
            "VALUE IRREP GM1-",
            "VALUE ELEMENT E 0 0 0",
            "SHOW MATRIX",
            "DISPLAY IRREP",
            "VALUE ELEMENT I 0 0 0",
            "DISPLAY IRREP",
            "QUIT",
        ]);
    }

    #[test]
    fn stale_state_is_cancelled() {
        let transcript = format!("{}{}{}{}{}", STARTUP, prompts(3), "\
    k vector
GM  (0,0,0)
X   (0,1/2,0)
DT  (0,a,0)

", prompts(4), "\
Irrep (ML)  Matrix
GM1+        1
GM4-        1

");
        let mut sent: Vec<u8> = vec![];
        {
            let mut session = Session::new(transcript.as_bytes(), &mut sent, &[]).unwrap();
            let ks = k_points(&mut session, 221).unwrap();
            assert_eq!(ks, vec![KPoint::new("GM", [0.0; 3]), KPoint::new("X", [0.0, 0.5, 0.0])]);
            let labels = irrep_labels(&mut session, 221, "GM").unwrap();
            assert_eq!(labels, vec!["GM1+", "GM4-"]);
        }
        assert_eq!(&written(&sent)[2..], &[
            "VALUE PARENT 221",
            "SHOW KPOINT",
            "DISPLAY KPOINT",
            "CANCEL SHOW KPOINT",
            "VALUE KPOINT GM",
            "SHOW IRREP",
            "DISPLAY IRREP",
            "QUIT",
        ]);
    }

    #[test]
    fn traces() {
        assert_eq!(trace(&convert("-1")).unwrap(), -1.0);
        assert_eq!(trace(&convert("(1,0) (0,-1/2)")).unwrap(), 0.5);
        assert_eq!(trace(&convert("0 1 0 1 0 0 0 0 1")).unwrap(), 1.0);
        assert!(trace(&convert("1 2 3")).is_err());
        assert!(trace(&convert("(1,0) (0)")).is_err());
    }
}
