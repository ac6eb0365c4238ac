//! # armada-remote
//!
//! Command-execution layer shared by every Armada subsystem that shells out:
//! local tools (`make`, `git`, `kubectl`) and remote transports (`ssh`,
//! `scp`).
//!
//! The [`Executor`] trait is the single seam between Armada and the outside
//! world; [`Session`] layers the run modifiers (dry-run, force, debug) on top
//! so they are explicit parameters rather than global state.

pub mod error;
pub mod exec;
pub mod remote;
pub mod session;

pub use error::ExecError;
pub use exec::{CommandSpec, ExecOutput, Executor, ShellExecutor};
pub use session::{Advisory, RunOptions, Session};
