//! Error types for armada-sync.

use std::path::PathBuf;

use thiserror::Error;

use armada_remote::ExecError;

/// All errors that can arise from convergence operations.
///
/// Each variant is a hard failure for the node being converged; the fleet
/// driver records it and moves on to the next node.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required local or remote command failed (ssh transport, scp, local
    /// tool missing). Advisory steps never surface here.
    #[error("command error: {0}")]
    Exec(#[from] ExecError),

    /// Local staging or digest I/O, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
