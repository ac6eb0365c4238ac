//! Remote transport helpers: ssh command execution and scp file transfer.
//!
//! Single attempt per invocation, no retry — a failed node is reported and
//! skipped; a full re-run of the tool is the recovery mechanism.

use std::path::Path;

use crate::error::ExecError;
use crate::exec::CommandSpec;
use crate::session::{Advisory, Session};

/// Run `command` on `node` over ssh as a required (mutating) step.
pub fn run(session: &Session, node: &str, command: &str) -> Result<Vec<u8>, ExecError> {
    session.run(&CommandSpec::new("ssh").arg("-q").arg(node).arg(command))
}

/// Run `command` on `node` over ssh as a read-only step. Executes even
/// under dry-run, so state inspection stays accurate.
pub fn query(session: &Session, node: &str, command: &str) -> Result<Vec<u8>, ExecError> {
    session.query(&CommandSpec::new("ssh").arg("-q").arg(node).arg(command))
}

/// Run `command` on `node` over ssh as a best-effort step.
pub fn run_advisory(session: &Session, node: &str, command: &str) -> Advisory {
    session.run_advisory(&CommandSpec::new("ssh").arg("-q").arg(node).arg(command))
}

/// Copy `local` to `node:dest_dir` with scp, compression enabled.
pub fn copy(session: &Session, local: &Path, node: &str, dest_dir: &str) -> Result<(), ExecError> {
    session
        .run(
            &CommandSpec::new("scp")
                .arg("-C")
                .arg(local.display().to_string())
                .arg(format!("{node}:{dest_dir}")),
        )
        .map(|_| ())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
