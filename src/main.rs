//! prefdb CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`, printing errors to
//! stderr and exiting non-zero on failure. All logic lives in the library.

use prefdb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
