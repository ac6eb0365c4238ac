//! Remote file push.
//!
//! The synchronizer only moves bytes; whether to move them at all is the
//! comparator's call, made by the convergence engine.

use std::path::Path;

use armada_remote::{remote, Session};

use crate::error::SyncError;

/// Copy `local` to `node:dest_dir`. Single attempt; failures return as-is.
pub fn push(session: &Session, local: &Path, node: &str, dest_dir: &str) -> Result<(), SyncError> {
    println!(
        "  Copying {} to {node} at {dest_dir}...",
        local.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| local.display().to_string())
    );
    remote::copy(session, local, node, dest_dir)?;
    Ok(())
}
