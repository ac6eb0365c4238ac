//! Systemd drop-in override rendering.
//!
//! The override is an ordered builder rather than ad-hoc string
//! concatenation so the formatting rules are explicit and tested:
//!
//! - flag lines are joined with ` \` continuations, and the final flag line
//!   carries no continuation marker;
//! - `Environment=` lines follow on their own lines with NO preceding
//!   continuation marker — a trailing `\` before the first env line breaks
//!   systemd's parse of the unit.

use std::fmt::Write as _;

/// Ordered builder for one `override.conf` drop-in.
#[derive(Debug, Clone)]
pub struct OverrideFile {
    exec_start: String,
    flags: Vec<String>,
    environment: Vec<(String, String)>,
}

impl OverrideFile {
    /// Start an override whose ExecStart runs `exec_start`.
    pub fn new(exec_start: impl Into<String>) -> Self {
        Self {
            exec_start: exec_start.into(),
            flags: Vec::new(),
            environment: Vec::new(),
        }
    }

    /// Append `--name=value` to the ExecStart line.
    pub fn flag(mut self, name: &str, value: &str) -> Self {
        self.flags.push(format!("--{name}={value}"));
        self
    }

    /// Append pre-formed arguments verbatim to the ExecStart line.
    pub fn raw_args(mut self, args: &str) -> Self {
        let trimmed = args.trim();
        if !trimmed.is_empty() {
            self.flags.push(trimmed.to_string());
        }
        self
    }

    /// Append an `Environment=NAME=value` line after the ExecStart block.
    pub fn env(mut self, name: &str, value: &str) -> Self {
        self.environment.push((name.to_string(), value.to_string()));
        self
    }

    /// Render the drop-in text. Deterministic: same inputs, same bytes.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("[Service]\n");
        // Blank ExecStart resets the unit's original command line.
        out.push_str("ExecStart=\n");

        let _ = write!(out, "ExecStart={}", self.exec_start);
        for flag in &self.flags {
            let _ = write!(out, " \\\n  {flag}");
        }

        for (name, value) in &self.environment {
            let _ = write!(out, "\nEnvironment={name}={value}");
        }

        out.push('\n');
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
