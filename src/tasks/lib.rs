/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! The binaries of isomode, as library functions.
//!
//! Each binary in `src/binary-shims` is a one-line call into `entry_points`.

#[macro_use] extern crate log;
#[macro_use] extern crate failure;
#[macro_use] extern crate clap;

pub type FailResult<T> = Result<T, failure::Error>;

mod ui;
mod adapter;
mod cmd;

pub mod entry_points;

pub use crate::adapter::PoscarAdapter;
pub use crate::cmd::{DecomposeArgs, BasisArgs, run_decompose, run_basis};
