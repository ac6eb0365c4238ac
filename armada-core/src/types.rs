//! Domain types for Armada configuration.
//!
//! Everything here is deserialized once from the YAML config files at startup
//! and treated as read-only for the duration of a run.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// One target system from `config/systems.yaml`.
///
/// A system is matched against the active Kubernetes context by `name` or any
/// of its `aliases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overlays: Vec<String>,
    /// Kubernetes worker nodes that receive the manager role.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workers: Vec<String>,
    /// Storage node name -> ordered list of dependent compute nodes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub storage_nodes: BTreeMap<String, Vec<String>>,
    /// Compute nodes not attached to any storage node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_computes: Vec<String>,
    /// Cluster API host override for daemons on compute nodes, which may need
    /// a different network to reach the cluster than the public-facing IP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k8s_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k8s_port: Option<String>,
}

impl System {
    /// True if `context` names this system directly or via an alias.
    pub fn matches(&self, context: &str) -> bool {
        self.name == context || self.aliases.iter().any(|a| a == context)
    }
}

/// Root of `config/systems.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SystemConfigFile {
    pub systems: Vec<System>,
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

/// One module repository from `config/repositories.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overlays: Vec<String>,
    /// Image registry URL used for builds off the master branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,
    /// Image registry URL used for development-branch builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development: Option<String>,
    /// Extra environment for `make` invocations in this repository.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
}

/// A cluster-level service installed during `armada init`, outside the
/// module build/deploy cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThirdPartyService {
    pub name: String,
    /// Manifest URL applied with `kubectl apply -f`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Full helm command line, run through `bash -c`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helm_cmd: Option<String>,
    /// Optional readiness wait command, run through `bash -c`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_cmd: Option<String>,
}

/// Root of `config/repositories.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RepositoryConfigFile {
    pub repositories: Vec<Repository>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub third_party_services: Vec<ThirdPartyService>,
}

// ---------------------------------------------------------------------------
// Daemons
// ---------------------------------------------------------------------------

/// A `NAME=value` environment binding rendered into the service override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// Service-account binding used to fetch token/cert material for a daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub name: String,
    pub namespace: String,
}

/// One installable agent from `config/daemons.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonSpec {
    /// Logical name; also the per-daemon config directory under `/etc/`.
    pub name: String,
    /// Binary name produced by the build and installed under `/usr/bin/`.
    /// A daemon without a binary still gets token/cert/override convergence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
    /// Local compile command, split on whitespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_cmd: Option<String>,
    /// Module repository the daemon is built from.
    pub repository: String,
    /// Subdirectory within the repository holding the build output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Suppress the `--storage-node-name` flag in the rendered override.
    #[serde(default)]
    pub skip_storage_node_name: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<ServiceAccount>,
    /// Extra arguments appended verbatim to the ExecStart line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_args: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<EnvVar>,
}

impl DaemonSpec {
    /// Systemd unit name: the binary name, or the daemon name when the
    /// daemon ships no binary of its own.
    pub fn unit_name(&self) -> &str {
        self.bin.as_deref().unwrap_or(&self.name)
    }
}

/// Root of `config/daemons.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DaemonConfigFile {
    pub daemons: Vec<DaemonSpec>,
}

// ---------------------------------------------------------------------------
// Cluster endpoint
// ---------------------------------------------------------------------------

/// The cluster API endpoint daemons are pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEndpoint {
    pub host: String,
    pub port: String,
}

impl ClusterEndpoint {
    /// Apply per-system host/port overrides on top of the discovered endpoint.
    pub fn with_overrides(mut self, system: &System) -> Self {
        if let Some(host) = &system.k8s_host {
            self.host = host.clone();
        }
        if let Some(port) = &system.k8s_port {
            self.port = port.clone();
        }
        self
    }
}

impl fmt::Display for ClusterEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
