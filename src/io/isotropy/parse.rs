/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Parsing of the column-aligned tables printed by `DISPLAY`.
//!
//! Numbers are left as text, because ISOTROPY writes (and wants back)
//! fractions like `1/2`. See [`crate::frac`] for conversions.

use crate::FailResult;

/// A cell of a table, split into its nested structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str>
    { match *self {
        Value::Text(ref s) => Some(s),
        Value::List(_) => None,
    }}

    /// The items of a list, with a text regarded as a list of one.
    pub fn items(&self) -> &[Value]
    { match *self {
        Value::Text(_) => std::slice::from_ref(self),
        Value::List(ref items) => items,
    }}

    /// All texts in the value, depth first.
    pub fn texts(&self) -> Vec<&str>
    {
        let mut out = vec![];
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>)
    { match *self {
        Value::Text(ref s) => out.push(s),
        Value::List(ref items) => items.iter().for_each(|v| v.collect_texts(out)),
    }}
}

/// One logical row of a table, keyed by column header.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&Value>
    { self.fields.iter().find(|&&(ref k, _)| k == key).map(|&(_, ref v)| v) }

    pub fn keys(&self) -> impl Iterator<Item=&str>
    { self.fields.iter().map(|&(ref k, _)| &k[..]) }

    /// Like `get`, but an error names the columns that were present.
    pub fn require(&self, key: &str) -> FailResult<&Value>
    {
        self.get(key).ok_or_else(|| {
            format_err!("ISOTROPY output has no column {:?} (columns: {:?})", key, self.keys().collect::<Vec<_>>())
        })
    }
}

/// Parse the lines of a `DISPLAY`, the first of which holds the headers.
pub fn parse_table(lines: &[String]) -> Vec<Record>
{
    if lines.is_empty() {
        return vec![];
    }
    let indices = column_indices(lines);
    let headers = split_by_indices(&indices, &lines[0]);

    let mut raw: Vec<Vec<Vec<String>>> = vec![];
    for line in &lines[1..] {
        let row = split_by_indices(&indices, line);
        if !row[0].is_empty() {
            raw.push(row.into_iter().map(|cell| vec![cell]).collect());
            continue;
        }
        // an empty first column continues the previous record
        match raw.last_mut() {
            Some(record) => {
                for (column, cell) in record.iter_mut().zip(row) {
                    if !cell.is_empty() {
                        column.push(cell);
                    }
                }
            },
            None => trace!("skipping continuation row without a record: {:?}", line),
        }
    }

    raw.into_iter().map(|record| Record {
        fields: headers.iter().cloned().zip(record).map(|(key, mut cells)| {
            let value = match cells.len() {
                1 => convert(&cells.remove(0)),
                _ => Value::List(cells.iter().map(|c| convert(c)).collect()),
            };
            (key, value)
        }).collect(),
    }).collect()
}

/// Start index (in chars) of every column.
///
/// A column begins wherever a run of character positions that are blank
/// on every line ends, provided the header line has text there.
pub fn column_indices(lines: &[String]) -> Vec<usize>
{
    let lines: Vec<Vec<char>> = lines.iter().map(|s| s.chars().collect()).collect();
    let width = lines.iter().map(|l| l.len()).min().unwrap_or(0);

    let mut indices = vec![0];
    let mut last_blank = false;
    for i in 0..width {
        let blank = lines.iter().all(|line| line[i] == ' ');
        if !blank && last_blank && lines[0][i] != ' ' {
            indices.push(i);
        }
        last_blank = blank;
    }
    indices
}

/// Cut a line at column indices, trimming trailing whitespace of each cell.
pub fn split_by_indices(indices: &[usize], line: &str) -> Vec<String>
{
    let chars: Vec<char> = line.chars().collect();
    let clamp = |i: usize| i.min(chars.len());

    let mut ends: Vec<usize> = indices[1..].to_vec();
    ends.push(chars.len());
    indices.iter().zip(ends).map(|(&start, end)| {
        let cell: String = chars[clamp(start)..clamp(end).max(clamp(start))].iter().collect();
        cell.trim_end().to_string()
    }).collect()
}

/// Recursively split the text of a cell.
///
/// In order of precedence: `|` outside parentheses, `,` outside parentheses,
/// parenthesized groups, whitespace.  Anything left is trimmed text.
pub fn convert(cell: &str) -> Value
{
    let pieces = split_outside_parens(cell, '|');
    if pieces.len() > 1 {
        return Value::List(pieces.iter().map(|p| convert(p)).collect());
    }

    let pieces = split_outside_parens(cell, ',');
    if pieces.len() > 1 {
        return Value::List(pieces.iter().map(|p| convert(p)).collect());
    }

    if cell.trim_start().starts_with('(') && cell.ends_with(')') {
        let mut groups = paren_groups(cell);
        return match groups.len() {
            0 => Value::Text(String::new()),
            1 => convert(&groups.remove(0)),
            _ => Value::List(groups.iter().map(|g| convert(g)).collect()),
        };
    }

    let words: Vec<&str> = cell.split_whitespace().collect();
    if words.len() > 1 {
        return Value::List(words.into_iter().map(convert).collect());
    }
    Value::Text(cell.trim().to_string())
}

// A separator is inside parentheses when the next parenthesis after it closes.
fn split_outside_parens(s: &str, sep: char) -> Vec<String>
{
    let mut out = vec![];
    let mut start = 0;
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != sep {
            continue;
        }
        let next_paren = s[i + c.len_utf8()..].chars().find(|&c| c == '(' || c == ')');
        if next_paren == Some(')') {
            continue;
        }
        out.push(s[start..i].to_string());
        start = i + c.len_utf8();
        while let Some(&(j, c)) = chars.peek() {
            if !c.is_whitespace() {
                break;
            }
            start = j + c.len_utf8();
            chars.next();
        }
    }
    out.push(s[start..].to_string());
    out
}

// The contents of each `(...)`, ending at the first `)` after at least one char.
fn paren_groups(s: &str) -> Vec<String>
{
    let chars: Vec<char> = s.chars().collect();
    let mut out = vec![];
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '(' && i + 2 <= chars.len() {
            if let Some(offset) = chars[i + 2..].iter().position(|&c| c == ')') {
                let end = i + 2 + offset;
                out.push(chars[i + 1..end].iter().collect());
                i = end + 1;
                continue;
            }
        }
        i += 1;
    }
    out
}
