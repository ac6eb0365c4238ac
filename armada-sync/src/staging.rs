//! Transient local staging with guaranteed cleanup.
//!
//! Token and cert material, and the rendered override text, are written to
//! fixed filenames in the staging directory only long enough to be
//! fingerprinted and pushed. The [`StagedFile`] guard removes the file when
//! it goes out of scope — on success, comparator failure, and synchronizer
//! failure alike — so secret material never outlives a single convergence
//! step.
//!
//! Fixed filenames assume single-instance execution; the run is strictly
//! sequential, so no two convergence steps can collide.

use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Fixed staging filename for service-account tokens.
pub const TOKEN_FILE: &str = "service.token";
/// Fixed staging filename for service CA certificates.
pub const CERT_FILE: &str = "service.cert";
/// Fixed staging filename for rendered service overrides.
pub const OVERRIDE_FILE: &str = "override.conf";

/// A staged local file, removed on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Write `contents` to `<dir>/<name>`.
    pub fn write(dir: &Path, name: &str, contents: &[u8]) -> Result<Self, SyncError> {
        let path = dir.join(name);
        std::fs::write(&path, contents).map_err(|e| io_err(&path, e))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            // Leaving secret material behind is worth a loud warning, but a
            // failed unlink must not mask the original error path.
            log::warn!("failed to remove staged file {}: {err}", self.path.display());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn staged_file_exists_while_held() {
        let dir = TempDir::new().expect("tempdir");
        let staged = StagedFile::write(dir.path(), TOKEN_FILE, b"secret").expect("stage");
        assert_eq!(fs::read(staged.path()).expect("read"), b"secret");
    }

    #[test]
    fn staged_file_removed_on_drop() {
        let dir = TempDir::new().expect("tempdir");
        let path = {
            let staged = StagedFile::write(dir.path(), CERT_FILE, b"pem").expect("stage");
            staged.path().to_path_buf()
        };
        assert!(!path.exists(), "staged file must be removed on drop");
    }

    #[test]
    fn staged_file_removed_even_when_caller_errors() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(OVERRIDE_FILE);

        let result: Result<(), SyncError> = (|| {
            let _staged = StagedFile::write(dir.path(), OVERRIDE_FILE, b"[Service]")?;
            Err(SyncError::Io {
                path: path.clone(),
                source: std::io::Error::other("simulated push failure"),
            })
        })();

        assert!(result.is_err());
        assert!(!path.exists(), "cleanup must run on the error path too");
    }

    #[test]
    fn unwritable_staging_dir_is_an_io_error() {
        let dir = TempDir::new().expect("tempdir");
        let missing = dir.path().join("no-such-subdir");
        let err = StagedFile::write(&missing, TOKEN_FILE, b"x").unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }
}
