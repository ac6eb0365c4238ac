//! The `Executor` seam and its production implementation.

use std::path::PathBuf;
use std::process::Stdio;

// ---------------------------------------------------------------------------
// CommandSpec
// ---------------------------------------------------------------------------

/// A fully-described command invocation: program, arguments, extra
/// environment, optional working directory and optional stdin bytes.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    pub stdin: Option<Vec<u8>>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((name.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn stdin(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(bytes.into());
        self
    }

    /// Human-readable command line used in progress and dry-run output.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

// ---------------------------------------------------------------------------
// ExecOutput
// ---------------------------------------------------------------------------

/// Captured result of a finished command.
///
/// `code` is `None` when the process was terminated by a signal.
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// The single seam between Armada and external programs.
///
/// Production code uses [`ShellExecutor`]; tests substitute scripted
/// implementations so no real `ssh`/`kubectl`/`git` is ever required.
pub trait Executor {
    /// Run the command to completion, capturing stdout and stderr.
    ///
    /// An `Err` means the program could not be started or waited on; a
    /// non-zero exit is reported through [`ExecOutput::code`], not as an
    /// `Err`.
    fn run(&self, command: &CommandSpec) -> std::io::Result<ExecOutput>;
}

/// Production executor over `std::process::Command`.
#[derive(Debug, Default)]
pub struct ShellExecutor;

impl Executor for ShellExecutor {
    fn run(&self, command: &CommandSpec) -> std::io::Result<ExecOutput> {
        let mut cmd = std::process::Command::new(&command.program);
        cmd.args(&command.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        for (name, value) in &command.env {
            cmd.env(name, value);
        }
        if let Some(cwd) = &command.cwd {
            cmd.current_dir(cwd);
        }

        let output = match &command.stdin {
            Some(bytes) => {
                cmd.stdin(Stdio::piped());
                let mut child = cmd.spawn()?;
                if let Some(mut stdin) = child.stdin.take() {
                    use std::io::Write;
                    stdin.write_all(bytes)?;
                }
                child.wait_with_output()?
            }
            None => {
                cmd.stdin(Stdio::null());
                cmd.output()?
            }
        };

        Ok(ExecOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
