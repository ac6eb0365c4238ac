//! Error types for armada-remote.

use thiserror::Error;

/// All errors that can arise from command execution.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be started at all (not installed, not in PATH).
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited non-zero (or was killed by a signal).
    #[error("command '{command}' failed{}: {stderr}", exit_label(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {code}"),
        None => " (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_error_includes_code_and_stderr() {
        let err = ExecError::Failed {
            command: "ssh compute-01 true".to_string(),
            code: Some(255),
            stderr: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit code 255"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn signal_termination_is_labelled() {
        let err = ExecError::Failed {
            command: "make deploy".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
