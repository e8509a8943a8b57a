//! Destination URI command.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::dst_uri::{prepare_dst_uri, PipelineFolder};
use crate::utils::settings::{Settings, DST_URI_VAR};

/// Dst-uri command options.
#[derive(Parser)]
pub struct DstUriCommand {
    /// Base location: a local path, a file:// URI or a remote URI such as
    /// gs://bucket/folder. Falls back to JOBSPEC_DST_URI.
    pub uri: Option<String>,

    /// Subject identifier.
    #[arg(long)]
    pub subject_id: String,

    /// Session identifier.
    #[arg(long)]
    pub session_id: String,

    /// Pipeline name.
    #[arg(long)]
    pub pipeline_name: String,

    /// Pipeline version.
    #[arg(long)]
    pub pipeline_version: String,

    /// Job identifier.
    #[arg(long)]
    pub job_id: String,

    /// Does not create local directories.
    #[arg(long)]
    pub no_create: bool,
}

impl DstUriCommand {
    /// Executes the dst-uri command.
    pub fn execute(self) -> Result<()> {
        let dst_uri = self.resolve()?;
        println!("{dst_uri}");
        Ok(())
    }

    /// Composes the destination URI, creating local directories unless
    /// `--no-create` was given.
    ///
    /// The settings file is only read when no URI was passed.
    pub fn resolve(&self) -> Result<String> {
        let settings = match self.uri {
            Some(_) => Settings::default(),
            None => Settings::load()?,
        };
        self.resolve_with(&settings)
    }

    /// Like [`resolve`](Self::resolve), taking the `JOBSPEC_DST_URI` fallback
    /// from the environment or the given settings.
    pub fn resolve_with(&self, settings: &Settings) -> Result<String> {
        let base = match &self.uri {
            Some(uri) => uri.clone(),
            None => settings
                .get_env_var(DST_URI_VAR)
                .with_context(|| format!("No destination URI given and {DST_URI_VAR} is not set"))?,
        };

        let folder = PipelineFolder::new(
            self.subject_id.as_str(),
            self.session_id.as_str(),
            self.pipeline_name.as_str(),
            self.pipeline_version.as_str(),
            self.job_id.as_str(),
        );

        let dst_uri = prepare_dst_uri(&base, &folder, !self.no_create)
            .with_context(|| format!("Failed to prepare destination under {base}"))?;
        info!(base = %base, dst_uri = %dst_uri, "Prepared destination URI");
        Ok(dst_uri)
    }
}
