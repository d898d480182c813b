/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Numbers in the notation ISOTROPY reads and writes.

use crate::FailResult;
use crate::parse::Value;

/// Parse `1/2`, `-1/3`, `0.25` or `2`.
pub fn parse_number(s: &str) -> FailResult<f64>
{Ok({
    let s = s.trim();
    let parse = |t: &str| t.trim().parse::<f64>().map_err(|_| format_err!("not a number: {:?}", s));
    match s.find('/') {
        Some(i) => {
            let den = parse(&s[i + 1..])?;
            ensure!(den != 0.0, "zero denominator: {:?}", s);
            parse(&s[..i])? / den
        },
        None => parse(s)?,
    }
})}

/// Parse every text in a value, depth first.
pub fn parse_numbers(value: &Value) -> FailResult<Vec<f64>>
{ value.texts().into_iter().map(parse_number).collect() }

/// Parse a value holding exactly three numbers.
pub fn parse_v3(value: &Value) -> FailResult<[f64; 3]>
{Ok({
    let numbers = parse_numbers(value)?;
    ensure!(numbers.len() == 3, "expected 3 numbers, got {:?}", value.texts());
    [numbers[0], numbers[1], numbers[2]]
})}

/// The fraction closest to `x` whose denominator is at most `max_denominator`.
///
/// Ties go to the smaller denominator.
pub fn closest_fraction(x: f64, max_denominator: i64) -> (i64, i64)
{
    let mut best = (x.round() as i64, 1);
    let mut best_error = (x - x.round()).abs();
    for den in 2..=max_denominator {
        let num = (x * den as f64).round();
        let error = (x - num / den as f64).abs();
        if error < best_error - 1e-12 {
            best = (num as i64, den);
            best_error = error;
        }
    }
    reduce(best)
}

fn reduce((num, den): (i64, i64)) -> (i64, i64)
{
    let (mut a, mut b) = (num.abs(), den);
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    match a {
        0 => (0, 1),
        g => (num / g, den / g),
    }
}

/// Write a number as the closest fraction with denominator at most 10.
pub fn format_fraction(x: f64) -> String
{
    match closest_fraction(x, 10) {
        (num, 1) => format!("{}", num),
        (num, den) => format!("{}/{}", num, den),
    }
}

/// An origin as ISOTROPY reads it, e.g. `1/2,0,1/4`.
pub fn origin_string(origin: &[f64; 3]) -> String
{
    origin.iter().map(|&x| format_fraction(x)).collect::<Vec<_>>().join(",")
}

/// An integer matrix as ISOTROPY reads it, e.g. `2,0,0 0,2,0 0,0,1`.
pub fn matrix_string(matrix: &[[i32; 3]; 3]) -> String
{
    matrix.iter()
        .map(|row| row.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join(" ")
}
