//! # jobspec-tools
//!
//! Small helpers used when preparing the outputs of a pipeline job.
//!
//! ## Features
//!
//! - Logger configuration driven by a verbosity count or an explicit level
//! - Optional temporary working directories with scoped cleanup
//! - Destination URIs scoped to subject, session, pipeline and job
//! - Identifier normalization to lowercase alphanumerics
//!
//! ## Quick Start
//!
//! ```rust
//! use jobspec_tools::{lowercase_alnum, prepare_dst_uri, PipelineFolder};
//!
//! let folder = PipelineFolder::new("sub1", "ses2", "fake-pipe", "0.0.0", "001");
//! let uri = prepare_dst_uri("gs://bkt/folder", &folder, true).unwrap();
//! assert_eq!(uri, "gs://bkt/folder/sub1/ses2/fake-pipe/0.0.0/001");
//! assert_eq!(lowercase_alnum("Hello, World!"), "helloworld");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod dst_uri;
pub mod error;
pub mod logging;
pub mod utils;
pub mod workdir;

pub use crate::cli::Cli;
pub use crate::dst_uri::{prepare_dst_uri, Destination, PipelineFolder};
pub use crate::error::{JobspecError, Result};
pub use crate::logging::{configure_logger, LogChannel, Severity, Sink};
pub use crate::utils::lowercase_alnum;
pub use crate::workdir::{optional_temporary_directory, with_work_dir, WorkDir};

/// The current version of jobspec-tools.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
