//! Optional temporary working directories.

use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{JobspecError, Result};

/// A working directory yielded for the duration of a scope.
///
/// A `Temporary` directory is owned: it and everything inside it are removed
/// when the guard is dropped. A `Provided` directory belongs to the caller and
/// is left untouched.
#[derive(Debug)]
pub enum WorkDir {
    /// Created by [`optional_temporary_directory`]; removed on drop.
    Temporary(TempDir),
    /// Supplied by the caller; never removed.
    Provided(PathBuf),
}

impl WorkDir {
    /// Returns the directory path.
    pub fn path(&self) -> &Path {
        match self {
            WorkDir::Temporary(dir) => dir.path(),
            WorkDir::Provided(path) => path,
        }
    }

    /// Returns true if the directory is removed when the guard goes away.
    pub fn is_temporary(&self) -> bool {
        matches!(self, WorkDir::Temporary(_))
    }

    /// Releases the directory now, reporting any removal failure.
    ///
    /// Dropping the guard does the same but ignores errors.
    pub fn close(self) -> io::Result<()> {
        match self {
            WorkDir::Temporary(dir) => {
                debug!(path = %dir.path().display(), "Removing temporary work directory");
                dir.close()
            }
            WorkDir::Provided(_) => Ok(()),
        }
    }
}

impl Deref for WorkDir {
    type Target = Path;

    fn deref(&self) -> &Path {
        self.path()
    }
}

impl AsRef<Path> for WorkDir {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

/// Creates a temporary directory if one is not provided.
///
/// With `None` a fresh directory is created and removed, with its contents,
/// once the returned guard is dropped. With `Some(path)` the path must be an
/// existing directory; it is returned as is and never deleted.
///
/// # Errors
///
/// [`JobspecError::InvalidArgument`] if `workdir` does not exist or is not a
/// directory. Nothing is created in that case.
pub fn optional_temporary_directory<P: AsRef<Path>>(workdir: Option<P>) -> Result<WorkDir> {
    match workdir {
        None => {
            let dir = TempDir::new()?;
            debug!(path = %dir.path().display(), "Created temporary work directory");
            Ok(WorkDir::Temporary(dir))
        }
        Some(path) if path.as_ref().is_dir() => Ok(WorkDir::Provided(path.as_ref().to_path_buf())),
        Some(path) => Err(JobspecError::InvalidArgument {
            path: path.as_ref().to_path_buf(),
        }),
    }
}

/// Runs `f` inside an optional temporary directory.
///
/// The directory is released when `f` returns, and also if it panics.
pub fn with_work_dir<P, T, F>(workdir: Option<P>, f: F) -> Result<T>
where
    P: AsRef<Path>,
    F: FnOnce(&Path) -> T,
{
    let dir = optional_temporary_directory(workdir)?;
    let result = f(dir.path());
    dir.close()?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn default_creates_and_removes() {
        let dir = optional_temporary_directory(None::<&Path>).unwrap();
        let path = dir.path().to_path_buf();
        assert!(path.is_dir());
        assert!(dir.is_temporary());

        drop(dir);
        assert!(!path.exists());
    }

    #[test]
    fn default_removes_contents() {
        let dir = optional_temporary_directory(None::<&Path>).unwrap();
        let path = dir.path().to_path_buf();
        fs::create_dir_all(path.join("nested/deeper")).unwrap();
        fs::write(path.join("nested/deeper/out.txt"), "data").unwrap();

        dir.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn explicit_directory_is_kept() {
        let tmp = TempDir::new().unwrap();
        let dir = optional_temporary_directory(Some(tmp.path())).unwrap();
        assert_eq!(dir.path(), tmp.path());
        assert!(!dir.is_temporary());

        drop(dir);
        assert!(tmp.path().is_dir());
    }

    #[test]
    fn missing_directory_is_rejected() {
        let err = optional_temporary_directory(Some("/some/fake/dir/xyz/")).unwrap_err();
        assert!(matches!(
            err,
            JobspecError::InvalidArgument { ref path } if path == Path::new("/some/fake/dir/xyz/")
        ));
    }

    #[test]
    fn plain_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file.txt");
        fs::write(&file, "").unwrap();

        let err = optional_temporary_directory(Some(&file)).unwrap_err();
        assert!(matches!(err, JobspecError::InvalidArgument { .. }));
        assert!(file.exists());
    }

    #[test]
    fn with_work_dir_cleans_up_after_closure() {
        let seen = with_work_dir(None::<&Path>, |path| {
            assert!(path.is_dir());
            path.to_path_buf()
        })
        .unwrap();
        assert!(!seen.exists());
    }

    #[test]
    fn with_work_dir_cleans_up_on_panic() {
        let mut seen = PathBuf::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            with_work_dir(None::<&Path>, |path| {
                seen = path.to_path_buf();
                panic!("job failed");
            })
        }));
        assert!(outcome.is_err());
        assert!(!seen.as_os_str().is_empty());
        assert!(!seen.exists());
    }
}
