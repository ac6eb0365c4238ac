//! Run session: modifiers + executor, with dry-run gating.
//!
//! Three command classes, matching how they treat the target:
//!
//! - [`Session::run`] — mutates the target; skipped under dry-run.
//! - [`Session::query`] — read-only; always executed, even under dry-run
//!   (context discovery, checksum reads of local state, git reads).
//! - [`Session::run_advisory`] — mutates the target on a best-effort basis;
//!   failures are reported as a typed [`Advisory`] outcome, never escalated.

use crate::error::ExecError;
use crate::exec::{CommandSpec, ExecOutput, Executor};

/// Run modifiers threaded explicitly through every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub debug: bool,
    pub dry_run: bool,
    pub force: bool,
}

/// Outcome of a best-effort step.
///
/// Advisory steps cover service-lifecycle transitions where the prior remote
/// state is unknown (freshly provisioned node, never installed, partially
/// installed); their failures are logged and swallowed.
#[derive(Debug)]
pub enum Advisory {
    Completed,
    /// Dry-run suppressed the command.
    Skipped,
    Failed(ExecError),
}

impl Advisory {
    pub fn completed(&self) -> bool {
        matches!(self, Advisory::Completed)
    }
}

/// An executor plus the run modifiers.
pub struct Session {
    executor: Box<dyn Executor>,
    options: RunOptions,
}

impl Session {
    pub fn new(executor: Box<dyn Executor>, options: RunOptions) -> Self {
        Self { executor, options }
    }

    /// Production session over [`crate::ShellExecutor`].
    pub fn local(options: RunOptions) -> Self {
        Self::new(Box::new(crate::ShellExecutor), options)
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Run a mutating command. Under dry-run the command is not executed; a
    /// notice is printed and empty output returned.
    pub fn run(&self, command: &CommandSpec) -> Result<Vec<u8>, ExecError> {
        if self.options.dry_run {
            println!("  Dry-Run: skipping command '{}'", command.display());
            return Ok(Vec::new());
        }
        self.execute(command)
    }

    /// Run a read-only command. Always executed, dry-run or not.
    pub fn query(&self, command: &CommandSpec) -> Result<Vec<u8>, ExecError> {
        self.execute(command)
    }

    /// Run a best-effort mutating command; the outcome is informational only.
    pub fn run_advisory(&self, command: &CommandSpec) -> Advisory {
        if self.options.dry_run {
            println!("  Dry-Run: skipping command '{}'", command.display());
            return Advisory::Skipped;
        }
        match self.execute(command) {
            Ok(_) => Advisory::Completed,
            Err(err) => {
                log::warn!("advisory step '{}' failed: {err}", command.display());
                Advisory::Failed(err)
            }
        }
    }

    fn execute(&self, command: &CommandSpec) -> Result<Vec<u8>, ExecError> {
        if self.options.debug {
            log::debug!("exec: {}", command.display());
        }

        let output = self
            .executor
            .run(command)
            .map_err(|source| ExecError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if !output.success() {
            return Err(ExecError::Failed {
                command: command.display(),
                code: output.code,
                stderr: output.stderr_string().trim_end().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
