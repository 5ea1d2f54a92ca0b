//! Command-line interface definitions using clap

use clap::{Parser, Subcommand, ValueEnum};

use crate::data::TableKind;

/// limsmeta - LIMS metadata browser and deployment helper
#[derive(Parser)]
#[command(name = "limsmeta")]
#[command(version)]
#[command(about = "Browse Clarity LIMS metadata from a pinned SQLite snapshot", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, short = 'c', global = true, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    Serve,

    /// Download the pin and print table sizes and update info
    Fetch,

    /// Export a table as CSV
    Export {
        /// projects, samples or sequencing
        kind: TableKind,

        /// Column preset
        #[arg(long, value_enum)]
        preset: Option<ExportPreset>,

        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<String>,
    },

    /// Reagent catalog and LIMS connection
    Reagents {
        #[command(subcommand)]
        action: ReagentCommands,
    },

    /// Deployment steps run by CI
    Deploy {
        #[command(subcommand)]
        action: DeployCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportPreset {
    /// Columns needed by the Saga upload workflow
    Saga,
}

#[derive(Subcommand)]
pub enum ReagentCommands {
    /// List reagent types and next internal names
    Kits,
    /// Test the Clarity API connection
    Check,
}

#[derive(Subcommand)]
pub enum DeployCommands {
    /// Print the deploy mode and its branches
    Mode,
    /// Write the dependency list from Cargo.lock
    Lock,
    /// Write dependencies and manifest.json
    Manifest,
    /// Regenerate files, commit and force-push the deploy branches
    Publish {
        /// Print the git commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}
