//! # armada-k8s
//!
//! Kubernetes collaborators, all driven through `kubectl` via the
//! [`armada_remote::Session`] seam: context discovery, cluster endpoint
//! parsing, service-account secret material, SystemConfiguration resource
//! management, and node labels/taints.

pub mod context;
pub mod error;
pub mod nodes;
pub mod secrets;
pub mod system_config;

pub use context::{cluster_endpoint, current_context};
pub use error::K8sError;
pub use secrets::{service_account_material, SecretMaterial};
