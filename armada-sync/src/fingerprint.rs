//! Content fingerprint comparison.
//!
//! The local digest is computed in-process (SHA-256, hex); the remote digest
//! comes from `sha256sum` over ssh. The two are compared tolerantly: each
//! side is truncated at its first whitespace, because `sha256sum` output
//! carries a trailing filename. This is a deliberate, documented contract —
//! tightening it to a byte-identical comparison changes observable
//! convergence behavior against real tool output.

use std::path::Path;

use sha2::{Digest, Sha256};

use armada_remote::{remote, Session};

use crate::error::{io_err, SyncError};

/// SHA-256 hex digest of a local file's bytes.
pub fn local_digest(path: &Path) -> Result<String, SyncError> {
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Tolerant digest equality: both sides truncated at their first whitespace.
///
/// An empty side never matches — an absent remote file (empty `sha256sum`
/// output) must read as "different".
pub fn digests_match(local: &str, remote: &str) -> bool {
    let local = local.split_whitespace().next().unwrap_or("");
    let remote = remote.split_whitespace().next().unwrap_or("");
    !local.is_empty() && local == remote
}

/// Decide whether `node` needs a fresh copy of `local`.
///
/// - `--force` short-circuits to `true` without any remote access.
/// - The remote checksum is a read and always executes, dry-run included;
///   it fails soft on a missing file (`|| true`), which reads as
///   "different". An ssh transport failure is a hard error.
/// - Under dry-run a positive verdict is downgraded to `false` after a
///   notice, so no downstream push can occur.
pub fn needs_update(
    session: &Session,
    local: &Path,
    node: &str,
    remote_dir: &str,
) -> Result<bool, SyncError> {
    let name = local
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| local.display().to_string());

    println!("  Checking Compute Node {node} needs update to {name}...");

    if session.options().force {
        println!("    Update forced by --force option");
        return Ok(true);
    }

    let source = local_digest(local)?;
    log::debug!("source sha256 for {name}: {source}");

    let destination = remote::query(
        session,
        node,
        &format!("sha256sum {remote_dir}/{name} || true"),
    )?;
    let destination = String::from_utf8_lossy(&destination);
    log::debug!("destination sha256 for {name}: {}", destination.trim_end());

    let mut needs_update = !digests_match(&source, &destination);
    if needs_update {
        println!("  Compute Node {node} requires update to {name}");
    }

    if session.options().dry_run {
        needs_update = false;
        println!("  Dry-Run: skipping update of '{name}'");
    }

    Ok(needs_update)
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
    fn remote_output_with_trailing_filename_matches() {
        assert!(digests_match("abc123", "abc123  /usr/bin/mover-bin\n"));
    }

    #[test]
    fn differing_digests_do_not_match() {
        assert!(!digests_match("abc123", "def456  /usr/bin/mover-bin\n"));
    }

    #[test]
    fn empty_remote_output_reads_as_different() {
        assert!(!digests_match("abc123", ""));
        assert!(!digests_match("abc123", "  \n"));
    }

    #[test]
    fn empty_local_digest_never_matches() {
        assert!(!digests_match("", ""));
        assert!(!digests_match("", "abc123"));
    }

    #[test]
    fn prefix_alone_is_not_a_match() {
        // The tolerant comparison truncates at whitespace; it does not accept
        // arbitrary prefixes.
        assert!(!digests_match("abc", "abc123  file"));
    }

    #[test]
    fn local_digest_is_stable_hex_sha256() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("artifact");
        fs::write(&path, b"payload").expect("write");
        let digest = local_digest(&path).expect("digest");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, local_digest(&path).expect("digest again"));
    }

    #[test]
    fn local_digest_missing_file_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        let err = local_digest(&dir.path().join("absent")).unwrap_err();
        match err {
            SyncError::Io { path, .. } => assert!(path.ends_with("absent")),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
