//! Per-node daemon convergence engine.
//!
//! Per (daemon, node) pair, executed strictly sequentially:
//!
//! 1. directory bootstrap (`mkdir -p /etc/<name>`) iff token or cert exists
//! 2. token convergence (stage → compare → push iff drift → unstage)
//! 3. cert convergence (same shape)
//! 4. binary convergence — on drift: advisory stop, advisory remove,
//!    required copy, advisory install
//! 5. override render + convergence (always re-compared, so endpoint drift
//!    is caught even when nothing else changed)
//! 6. reload + start, iff anything updated
//!
//! A hard error aborts the node's remaining steps; the fleet driver records
//! the failure and continues with the next node.

use std::fmt;
use std::path::PathBuf;

use armada_core::{ClusterEndpoint, DaemonSpec};
use armada_remote::{remote, Session};

use crate::error::SyncError;
use crate::fingerprint;
use crate::override_file::OverrideFile;
use crate::staging::{StagedFile, CERT_FILE, OVERRIDE_FILE, TOKEN_FILE};
use crate::transfer;

/// Remote directory daemon binaries are installed into.
pub const BIN_DIR: &str = "/usr/bin";

/// The four managed artifacts a node converges on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Binary,
    ServiceToken,
    ServiceCert,
    OverrideConfig,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Binary => write!(f, "binary"),
            ArtifactKind::ServiceToken => write!(f, "service token"),
            ArtifactKind::ServiceCert => write!(f, "service cert"),
            ArtifactKind::OverrideConfig => write!(f, "override config"),
        }
    }
}

/// One compute node to converge, with its owning storage node if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTarget {
    pub compute: String,
    /// `None` for external computes not attached to a storage node.
    pub storage: Option<String>,
}

impl NodeTarget {
    pub fn new(compute: impl Into<String>, storage: Option<String>) -> Self {
        Self {
            compute: compute.into(),
            storage,
        }
    }
}

/// What happened on one node.
#[derive(Debug)]
pub struct NodeOutcome {
    pub node: String,
    pub updated: Vec<ArtifactKind>,
    pub restarted: bool,
}

/// A node whose convergence aborted partway.
#[derive(Debug)]
pub struct NodeFailure {
    pub node: String,
    pub error: SyncError,
}

/// Aggregated result of a fleet pass for one daemon.
#[derive(Debug, Default)]
pub struct FleetReport {
    pub outcomes: Vec<NodeOutcome>,
    pub failures: Vec<NodeFailure>,
}

impl FleetReport {
    pub fn all_converged(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Convergence of one daemon across a set of nodes.
pub struct Convergence<'a> {
    session: &'a Session,
    daemon: &'a DaemonSpec,
    endpoint: &'a ClusterEndpoint,
    token: Option<Vec<u8>>,
    cert: Option<Vec<u8>>,
    /// Directory holding the built binary and the transient staged files.
    staging: PathBuf,
}

impl<'a> Convergence<'a> {
    pub fn new(
        session: &'a Session,
        daemon: &'a DaemonSpec,
        endpoint: &'a ClusterEndpoint,
        staging: impl Into<PathBuf>,
    ) -> Self {
        Self {
            session,
            daemon,
            endpoint,
            token: None,
            cert: None,
            staging: staging.into(),
        }
    }

    /// Attach service-account token material to converge onto each node.
    pub fn with_token(mut self, token: Vec<u8>) -> Self {
        self.token = Some(token);
        self
    }

    /// Attach CA certificate material to converge onto each node.
    pub fn with_cert(mut self, cert: Vec<u8>) -> Self {
        self.cert = Some(cert);
        self
    }

    /// Converge every target in order. A failed node is recorded and skipped;
    /// the remaining nodes still run.
    pub fn converge_fleet(&self, targets: &[NodeTarget]) -> FleetReport {
        let mut report = FleetReport::default();

        for target in targets {
            println!(
                "\n Checking for install on Compute Node {}\n",
                target.compute
            );
            match self.converge_node(target) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(error) => {
                    println!(
                        "  Convergence failed on Compute Node {}: {error}",
                        target.compute
                    );
                    log::warn!("node {} failed: {error}", target.compute);
                    report.failures.push(NodeFailure {
                        node: target.compute.clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    /// Run the full convergence state machine against one node.
    pub fn converge_node(&self, target: &NodeTarget) -> Result<NodeOutcome, SyncError> {
        let node = &target.compute;
        let mut updated = Vec::new();

        println!("  Installing {} on Compute Node {node}", self.daemon.name);

        let config_dir = format!("/etc/{}", self.daemon.name);
        if self.token.is_some() || self.cert.is_some() {
            remote::run(self.session, node, &format!("mkdir -p {config_dir}"))?;
        }

        if let Some(token) = &self.token {
            if self.converge_staged(TOKEN_FILE, token, node, &config_dir)? {
                updated.push(ArtifactKind::ServiceToken);
            }
        }

        if let Some(cert) = &self.cert {
            if self.converge_staged(CERT_FILE, cert, node, &config_dir)? {
                updated.push(ArtifactKind::ServiceCert);
            }
        }

        if let Some(bin) = &self.daemon.bin {
            let local_bin = self.staging.join(bin);
            if fingerprint::needs_update(self.session, &local_bin, node, BIN_DIR)? {
                // The service may be in any prior state (never installed,
                // partially installed), so stop/remove/install are advisory.
                println!("  Stopping {} service...", self.daemon.name);
                remote::run_advisory(self.session, node, &format!("systemctl stop {bin}"));

                println!("  Removing {} service...", self.daemon.name);
                remote::run_advisory(self.session, node, &format!("{BIN_DIR}/{bin} remove"));

                transfer::push(self.session, &local_bin, node, BIN_DIR)?;

                println!("  Installing {} service...", self.daemon.name);
                remote::run_advisory(self.session, node, &format!("{BIN_DIR}/{bin} install"));

                updated.push(ArtifactKind::Binary);
            }
        }

        let unit = self.daemon.unit_name();
        let override_dir = format!("/etc/systemd/system/{unit}.service.d");

        println!("  Creating override directory...");
        remote::run(self.session, node, &format!("mkdir -p {override_dir}"))?;

        println!("  Creating override configuration...");
        let rendered = self.render_override(target, &config_dir);
        if self.converge_staged(OVERRIDE_FILE, rendered.as_bytes(), node, &override_dir)? {
            updated.push(ArtifactKind::OverrideConfig);
        }

        // The central optimization: a running data-path daemon is only ever
        // disturbed when at least one artifact actually changed.
        let restarted = !updated.is_empty();
        if restarted {
            println!("  Reloading service manager...");
            remote::run(self.session, node, "systemctl daemon-reload")?;

            println!("  Starting {unit} service...");
            remote::run(self.session, node, &format!("systemctl start {unit}"))?;
        }

        Ok(NodeOutcome {
            node: node.clone(),
            updated,
            restarted,
        })
    }

    /// Render the override drop-in for `target`. Rebuilt fresh every run so
    /// endpoint or spec drift is always detected.
    pub fn render_override(&self, target: &NodeTarget, config_dir: &str) -> String {
        let unit = self.daemon.unit_name();
        let mut file = OverrideFile::new(format!("{BIN_DIR}/{unit}"))
            .flag("kubernetes-service-host", &self.endpoint.host)
            .flag("kubernetes-service-port", &self.endpoint.port)
            .flag("node-name", &target.compute);

        if !self.daemon.skip_storage_node_name {
            if let Some(storage) = &target.storage {
                file = file.flag("storage-node-name", storage);
            }
        }
        if self.token.is_some() {
            file = file.flag("service-token-file", &format!("{config_dir}/{TOKEN_FILE}"));
        }
        if self.cert.is_some() {
            file = file.flag("service-cert-file", &format!("{config_dir}/{CERT_FILE}"));
        }
        if let Some(extra) = &self.daemon.extra_args {
            file = file.raw_args(extra);
        }
        for env in &self.daemon.environment {
            file = file.env(&env.name, &env.value);
        }

        file.render()
    }

    /// Stage `contents`, compare against the remote copy, push iff it
    /// drifted. The staged file is removed on every path out, including
    /// comparator and push failures.
    fn converge_staged(
        &self,
        name: &str,
        contents: &[u8],
        node: &str,
        dest_dir: &str,
    ) -> Result<bool, SyncError> {
        let staged = StagedFile::write(&self.staging, name, contents)?;
        let needs_update = fingerprint::needs_update(self.session, staged.path(), node, dest_dir)?;
        if needs_update {
            transfer::push(self.session, staged.path(), node, dest_dir)?;
        }
        Ok(needs_update)
    }
}
