//! Destination URIs scoped to a pipeline job.
//!
//! A destination is a base location (a local path, a `file://` URI or a
//! remote object storage URI such as `gs://bucket/folder`) extended with the
//! pipeline folder path `subject/session/pipeline-name/pipeline-version/job-id`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::{ParseError, Url};

use crate::error::Result;

/// The five segments identifying a job's output folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineFolder {
    /// Subject identifier.
    pub subject_id: String,
    /// Session identifier.
    pub session_id: String,
    /// Pipeline name.
    pub pipeline_name: String,
    /// Pipeline version.
    pub pipeline_version: String,
    /// Job identifier.
    pub job_id: String,
}

impl PipelineFolder {
    /// Creates a pipeline folder from its segments.
    pub fn new(
        subject_id: impl Into<String>,
        session_id: impl Into<String>,
        pipeline_name: impl Into<String>,
        pipeline_version: impl Into<String>,
        job_id: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            session_id: session_id.into(),
            pipeline_name: pipeline_name.into(),
            pipeline_version: pipeline_version.into(),
            job_id: job_id.into(),
        }
    }

    /// Returns the segments in path order.
    pub fn segments(&self) -> [&str; 5] {
        [
            &self.subject_id,
            &self.session_id,
            &self.pipeline_name,
            &self.pipeline_version,
            &self.job_id,
        ]
    }

    /// Returns the relative folder path, e.g. `sub1/ses2/fake-pipe/0.0.0/001`.
    pub fn relative_path(&self) -> String {
        self.segments()
            .iter()
            .fold(String::new(), |path, segment| join_path(&path, segment))
    }
}

/// Where a destination URI points, decided by its scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Empty or `file` scheme: a path on the local filesystem.
    LocalLike(PathBuf),
    /// Any other scheme, e.g. `gs`. Never touched locally.
    Other {
        /// Lowercased scheme name.
        scheme: String,
    },
}

impl Destination {
    /// Classifies a URI by scheme.
    ///
    /// Strings without a scheme are local paths. `file` URIs resolve to the
    /// path they name.
    pub fn parse(uri: &str) -> Self {
        match Url::parse(uri) {
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .unwrap_or_else(|()| PathBuf::from(url.path()));
                Destination::LocalLike(path)
            }
            Ok(url) => Destination::Other {
                scheme: url.scheme().to_string(),
            },
            Err(ParseError::RelativeUrlWithoutBase) => Destination::LocalLike(PathBuf::from(uri)),
            // Malformed authority or host; fall back to the scheme prefix alone.
            Err(_) => match scheme_prefix(uri) {
                Some(scheme) if scheme.eq_ignore_ascii_case("file") => {
                    let rest = &uri[scheme.len() + 1..];
                    Destination::LocalLike(PathBuf::from(path_after_authority(rest)))
                }
                Some(scheme) => Destination::Other {
                    scheme: scheme.to_ascii_lowercase(),
                },
                None => Destination::LocalLike(PathBuf::from(uri)),
            },
        }
    }

    /// Returns the local path for local-like destinations.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Destination::LocalLike(path) => Some(path),
            Destination::Other { .. } => None,
        }
    }
}

/// Generates a URI scoped to a subject, session, pipeline, version and job.
///
/// `uri` can be an object storage URI (`gs://my-bkt/sub/folder`), a local
/// directory (`./my/folder`) or a file URI (`file:///my/abs/folder`). The
/// result is the same with and without a trailing slash on `uri`.
///
/// When the result is local-like and `create` is true, the directory and all
/// its parents are created. Remote destinations are never created.
///
/// # Errors
///
/// Propagates the I/O error if the local directory cannot be created.
///
/// # Examples
///
/// ```
/// use jobspec_tools::{prepare_dst_uri, PipelineFolder};
///
/// let folder = PipelineFolder::new("sub1", "ses2", "fake-pipe", "0.0.0", "001");
/// let uri = prepare_dst_uri("gs://bkt/folder/", &folder, true).unwrap();
/// assert_eq!(uri, "gs://bkt/folder/sub1/ses2/fake-pipe/0.0.0/001");
/// ```
pub fn prepare_dst_uri(uri: &str, folder: &PipelineFolder, create: bool) -> Result<String> {
    let dst_uri = join_path(uri, &folder.relative_path());

    match Destination::parse(&dst_uri) {
        Destination::LocalLike(path) if create => {
            debug!(path = %path.display(), "Creating local destination directory");
            fs::create_dir_all(&path)?;
        }
        Destination::LocalLike(_) => {}
        Destination::Other { scheme } => {
            debug!(%scheme, uri = %dst_uri, "Remote destination, nothing to create");
        }
    }

    Ok(dst_uri)
}

/// Joins two path strings with `/`.
///
/// An absolute `tail` replaces `base`, and no separator is added when `base`
/// is empty or already ends with one.
fn join_path(base: &str, tail: &str) -> String {
    if tail.starts_with('/') || base.is_empty() {
        tail.to_string()
    } else if base.ends_with('/') {
        format!("{base}{tail}")
    } else {
        format!("{base}/{tail}")
    }
}

/// Path component of a URI remainder (everything after `scheme:`), skipping
/// a `//authority` if present and dropping any query or fragment.
fn path_after_authority(rest: &str) -> &str {
    let path = match rest.strip_prefix("//") {
        Some(after) => after
            .find(['/', '?', '#'])
            .map_or("", |end| &after[end..]),
        None => rest,
    };
    path.find(['?', '#']).map_or(path, |end| &path[..end])
}

fn scheme_prefix(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}
