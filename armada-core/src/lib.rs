//! Armada core library — configuration data model, loaders, release manifest.
//!
//! Public API surface:
//! - [`types`] — systems, repositories, daemons, cluster endpoint
//! - [`config`] — YAML loaders and lookups
//! - [`release`] — release manifest types and persistence
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod release;
pub mod types;

pub use error::ConfigError;
pub use types::{
    ClusterEndpoint, DaemonSpec, EnvVar, Repository, ServiceAccount, System, ThirdPartyService,
};
