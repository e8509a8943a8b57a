//! Error handling for jobspec-tools.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, JobspecError>;

/// Errors raised by the job output helpers.
#[derive(Error, Debug)]
pub enum JobspecError {
    /// A supplied working directory does not exist or is not a directory.
    #[error("'workdir' must be an existing directory. Found [{}]", .path.display())]
    InvalidArgument {
        /// The offending path.
        path: PathBuf,
    },

    /// Filesystem failure, passed through unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A global tracing subscriber could not be installed.
    #[error("Failed to install log subscriber: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_names_path() {
        let err = JobspecError::InvalidArgument {
            path: PathBuf::from("/some/fake/dir/xyz/"),
        };
        assert!(err.to_string().contains("/some/fake/dir/xyz/"));
    }

    #[test]
    fn io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = JobspecError::from(io);
        assert_eq!(err.to_string(), "denied");
        assert!(matches!(err, JobspecError::Io(ref e) if e.kind() == std::io::ErrorKind::PermissionDenied));
    }
}
