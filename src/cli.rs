//! CLI interface for jobspec-tools.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::logging::{configure_logger, LogChannel, Severity};

pub mod dst_uri;
pub mod normalize;
pub mod workdir;

/// Log channel used by the command-line tool.
pub const LOG_TARGET: &str = "jobspec_tools";

/// jobspec-tools: helpers for preparing pipeline job outputs.
#[derive(Parser)]
#[command(name = "jobspec-tools")]
#[command(about = "Helpers for preparing pipeline job outputs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increases log verbosity (-v info, -vv debug, -vvv everything).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decreases log verbosity (-q errors only, -qq critical only).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Explicit log severity threshold (0-50); overrides --verbose and --quiet.
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<u32>,

    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Prints the destination URI for a pipeline job.
    #[command(name = "dst-uri")]
    DstUri(dst_uri::DstUriCommand),
    /// Normalizes an identifier to lowercase alphanumerics.
    Normalize(normalize::NormalizeCommand),
    /// Validates or creates a working directory.
    Workdir(workdir::WorkdirCommand),
}

impl Cli {
    /// Builds the log channel configured from the global flags.
    pub fn log_channel(&self) -> LogChannel {
        let mut channel = LogChannel::new(LOG_TARGET);
        configure_logger(
            &mut channel,
            i32::from(self.verbose) - i32::from(self.quiet),
            self.log_level.map(Severity::new),
        );
        channel
    }

    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::DstUri(dst_uri_cmd) => dst_uri_cmd.execute(),
            Commands::Normalize(normalize_cmd) => normalize_cmd.execute(),
            Commands::Workdir(workdir_cmd) => workdir_cmd.execute(),
        }
    }
}
