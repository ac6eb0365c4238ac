//! Git state helpers for the module checkouts.
//!
//! Reads go through [`Session::query`] so release inspection works under
//! dry-run; tag creation and checkout are mutations and respect it.

use armada_remote::{CommandSpec, ExecError, Session};

fn query_line(session: &Session, cmd: CommandSpec) -> Result<String, ExecError> {
    let out = session.query(&cmd)?;
    Ok(String::from_utf8_lossy(&out).trim_end().to_string())
}

/// The checked-out branch name; empty for a detached HEAD.
pub fn current_branch(session: &Session) -> Result<String, ExecError> {
    query_line(session, CommandSpec::new("git").args(["branch", "--show-current"]))
}

/// The full commit hash of HEAD.
pub fn last_commit(session: &Session) -> Result<String, ExecError> {
    query_line(session, CommandSpec::new("git").args(["rev-parse", "HEAD"]))
}

/// The origin remote URL.
pub fn repo_url(session: &Session) -> Result<String, ExecError> {
    query_line(
        session,
        CommandSpec::new("git").args(["config", "--get", "remote.origin.url"]),
    )
}

/// The tag pointing at HEAD; empty when HEAD is untagged.
pub fn current_tag(session: &Session) -> Result<String, ExecError> {
    query_line(session, CommandSpec::new("git").args(["tag", "--points-at", "HEAD"]))
}

/// Create an annotated tag on HEAD.
pub fn add_tag(session: &Session, tag: &str) -> Result<(), ExecError> {
    session
        .run(
            &CommandSpec::new("git")
                .args(["tag", "-a", tag, "-m"])
                .arg(format!("version {tag}")),
        )
        .map(|_| ())
}

/// Check out a commit or tag, detaching HEAD.
pub fn checkout(session: &Session, rev: &str) -> Result<(), ExecError> {
    session
        .run(&CommandSpec::new("git").arg("checkout").arg(rev))
        .map(|_| ())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
