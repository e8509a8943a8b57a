//! Working directory command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::workdir::optional_temporary_directory;

/// Workdir command options.
#[derive(Parser)]
pub struct WorkdirCommand {
    /// Existing directory to use. A temporary one is created when omitted.
    pub path: Option<PathBuf>,
}

impl WorkdirCommand {
    /// Executes the workdir command.
    pub fn execute(self) -> Result<()> {
        let dir = optional_temporary_directory(self.path.as_deref())?;
        println!("{}", dir.path().display());

        if dir.is_temporary() {
            info!(path = %dir.path().display(), "Temporary directory removed on exit");
        }

        dir.close()
            .context("Failed to remove temporary work directory")?;
        Ok(())
    }
}
