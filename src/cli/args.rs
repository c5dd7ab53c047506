//! CLI argument definitions using clap
//!
//! Commands:
//! - prefdb dump --config <path>
//! - prefdb migrate --config <path> [--dry-run]
//! - prefdb get --config <path> <key>
//! - prefdb set --config <path> <key> <raw>
//! - prefdb keys --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// prefdb - inspect and migrate a typed preference store
#[derive(Parser, Debug)]
#[command(name = "prefdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the store and print the raw map
    Dump {
        /// Path to configuration file
        #[arg(long, default_value = "./prefdb.json")]
        config: PathBuf,
    },

    /// Run the migration pass
    Migrate {
        /// Path to configuration file
        #[arg(long, default_value = "./prefdb.json")]
        config: PathBuf,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Print one preference's current value
    Get {
        /// Path to configuration file
        #[arg(long, default_value = "./prefdb.json")]
        config: PathBuf,

        /// Preference key (`group__name`)
        key: String,
    },

    /// Set one preference from its raw encoding
    Set {
        /// Path to configuration file
        #[arg(long, default_value = "./prefdb.json")]
        config: PathBuf,

        /// Preference key (`group__name`)
        key: String,

        /// Raw value, e.g. `true`, `300`, `ALWAYS_NIGHT`
        raw: String,
    },

    /// List declared keys with their group and default
    Keys {
        /// Path to configuration file
        #[arg(long, default_value = "./prefdb.json")]
        config: PathBuf,
    },
}

impl Command {
    /// Configuration file this command reads
    pub fn config_path(&self) -> &PathBuf {
        match self {
            Command::Dump { config }
            | Command::Migrate { config, .. }
            | Command::Get { config, .. }
            | Command::Set { config, .. }
            | Command::Keys { config } => config,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
