//! # armada-sync
//!
//! Per-node daemon convergence: decides which managed artifacts (binary,
//! service token, service cert, override config) are stale on a remote
//! compute node, pushes only what drifted, and restarts the service only
//! when something actually changed.
//!
//! Layers, leaves first:
//! - [`fingerprint`] — content digest comparison (local SHA-256 vs remote
//!   `sha256sum`)
//! - [`transfer`] — scp push, single attempt
//! - [`staging`] — transient local staging with guaranteed cleanup
//! - [`override_file`] — systemd drop-in rendering rules
//! - [`convergence`] — the per-node state machine and fleet driver

pub mod convergence;
pub mod error;
pub mod fingerprint;
pub mod override_file;
pub mod staging;
pub mod transfer;

pub use convergence::{
    ArtifactKind, Convergence, FleetReport, NodeFailure, NodeOutcome, NodeTarget,
};
pub use error::SyncError;
pub use override_file::OverrideFile;
