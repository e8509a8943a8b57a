//! Identifier normalization command.

use anyhow::Result;
use clap::Parser;

use crate::utils::lowercase_alnum;

/// Normalize command options.
#[derive(Parser)]
pub struct NormalizeCommand {
    /// Text to normalize.
    pub text: String,
}

impl NormalizeCommand {
    /// Executes the normalize command.
    pub fn execute(self) -> Result<()> {
        println!("{}", lowercase_alnum(&self.text));
        Ok(())
    }
}
