//! CLI module for prefdb
//!
//! An operator tool over the file-backed application store:
//! - dump: print the post-load raw map
//! - migrate: run (or preview) the migration pass
//! - get / set: read or write one preference by key
//! - keys: list the declared schema

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{dump, get, keys, migrate, migrate_dry_run, run_command, set};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_envelope, ok_envelope, write_error, write_response};

use crate::observability::Logger;

/// Parse arguments, run the command, and print its JSON result.
///
/// On failure the error envelope is printed to stdout and the error is
/// returned for the caller to report.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    // stdout carries the result document only
    Logger::set_stderr_only(true);
    match run_command(&cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}
