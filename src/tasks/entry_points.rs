/* ************************************************************************ **
** This file is part of isomode, and is licensed under EITHER the MIT       **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

use crate::FailResult;
use crate::cmd::{DecomposeArgs, BasisArgs};
use crate::ui::logging::GlobalLogger;

use std::ffi::OsStr;
use std::path::PathBuf;

use clap::{App, Arg, ArgMatches};

fn wrap_result_main<F>(main: F)
where F: FnOnce() -> FailResult<()>,
{
    main().unwrap_or_else(|e| {
        for cause in e.iter_chain() {
            error!("{}", cause);
        }

        if std::env::var_os("RUST_BACKTRACE") == Some(OsStr::new("1").to_owned()) {
            error!("{}", e.backtrace());
        } else {
            error!("(for a backtrace, try again with RUST_BACKTRACE=1)");
        }
        std::process::exit(1);
    });
}

fn config_arg<'a, 'b>() -> Arg<'a, 'b>
{
    Arg::with_name("config")
        .short("c").long("config")
        .value_name("CONFIG")
        .takes_value(true)
        .required(true)
        .help("settings yaml; relative paths inside are taken relative to its directory")
}

fn verbose_arg<'a, 'b>() -> Arg<'a, 'b>
{
    Arg::with_name("verbose")
        .short("v").long("verbose")
        .multiple(true)
        .help("log trace messages of the isomode crates")
}

fn log_arg<'a, 'b>() -> Arg<'a, 'b>
{
    Arg::with_name("log")
        .long("log")
        .value_name("LOGFILE")
        .takes_value(true)
        .help("also write the log to this file")
}

fn init_logger(matches: &ArgMatches<'_>) -> FailResult<()>
{
    let mut logger = GlobalLogger::default();
    logger.verbosity(matches.occurrences_of("verbose") as i32);
    if let Some(path) = matches.value_of_os("log") {
        logger.path(path);
    }
    logger.apply()
}

fn path_of(matches: &ArgMatches<'_>, name: &str) -> Option<PathBuf>
{ matches.value_of_os(name).map(PathBuf::from) }

// -------------------------------------------------------------------------------------

pub fn isomode_decompose()
{
    wrap_result_main(|| {
        let matches = App::new("isomode-decompose")
            .version(crate_version!())
            .about("Decompose a distorted structure into symmetry-adapted modes of its parent.")
            .args(&[
                config_arg(),
                Arg::with_name("output")
                    .short("o").long("output")
                    .value_name("OUTPUT")
                    .takes_value(true)
                    .help("write the report here instead of stdout"),
                Arg::with_name("write_reference")
                    .long("write-reference")
                    .value_name("POSCAR")
                    .takes_value(true)
                    .help("write the undistorted parent in the working cell"),
                verbose_arg(),
                log_arg(),
            ])
            .get_matches();
        init_logger(&matches)?;

        let args = DecomposeArgs {
            config: path_of(&matches, "config").ok_or_else(|| format_err!("--config is required"))?,
            output: path_of(&matches, "output"),
            write_reference: path_of(&matches, "write_reference"),
        };
        crate::cmd::run_decompose(&args)?;
        Ok(())
    });
}

pub fn isomode_basis()
{
    wrap_result_main(|| {
        let matches = App::new("isomode-basis")
            .version(crate_version!())
            .about("Print the symmetry-adapted displacement modes of a parent structure.")
            .args(&[
                config_arg(),
                verbose_arg(),
                log_arg(),
            ])
            .get_matches();
        init_logger(&matches)?;

        let args = BasisArgs {
            config: path_of(&matches, "config").ok_or_else(|| format_err!("--config is required"))?,
        };
        crate::cmd::run_basis(&args)?;
        Ok(())
    });
}
