/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! A wrapper around the ISOTROPY command line program.
//!
//! [`Session`] speaks the interactive protocol of `iso`: it manages the
//! `VALUE`/`SHOW` state of the program and reads `DISPLAY` output, which
//! [`parse`] turns into records of nested [`Value`]s.  The functions in
//! [`queries`] build on it to fetch operations, k-points and irreps, and
//! [`IsotropyProvider`] exposes them as a `SymmetryDataProvider`.

#[macro_use] extern crate log;
#[macro_use] extern crate failure;
#[cfg(test)] #[macro_use] extern crate isomode_assert_close;
#[cfg(test)] #[macro_use] extern crate pretty_assertions;

pub type FailResult<T> = Result<T, failure::Error>;

pub mod parse;
pub mod frac;
mod session;
pub mod queries;
mod provider;

pub use crate::parse::{Value, Record};
pub use crate::session::{Session, ProcessSession, SessionConfig, IsotropyError};
pub use crate::provider::IsotropyProvider;
