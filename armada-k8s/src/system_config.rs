//! SystemConfiguration resource management.
//!
//! The workflow-services operator consumes a cluster-scoped
//! SystemConfiguration resource describing the node topology. Armada builds
//! it from `config/systems.yaml` and applies it alongside the owning module's
//! deploy, and deletes it (waiting for finalizers) on undeploy.

use serde_json::json;

use armada_core::System;
use armada_remote::{CommandSpec, Session};

use crate::error::K8sError;

const API_VERSION: &str = "workflow.keel.dev/v1alpha1";
const KIND: &str = "SystemConfiguration";
const RESOURCE: &str = "systemconfiguration";
const NAME: &str = "default";

/// Render the SystemConfiguration JSON for `system`'s topology.
pub fn render(system: &System) -> serde_json::Value {
    let mut compute_nodes = Vec::new();
    let mut storage_nodes = Vec::new();

    for (storage, computes) in &system.storage_nodes {
        let mut computes_access = Vec::new();
        for (index, compute) in computes.iter().enumerate() {
            compute_nodes.push(json!({ "name": compute }));
            computes_access.push(json!({ "name": compute, "index": index }));
        }
        storage_nodes.push(json!({
            "type": "Storage",
            "name": storage,
            "computesAccess": computes_access,
        }));
    }

    for compute in &system.external_computes {
        compute_nodes.push(json!({ "name": compute }));
    }

    json!({
        "apiVersion": API_VERSION,
        "kind": KIND,
        "metadata": { "name": NAME, "namespace": "default" },
        "spec": {
            "computeNodes": compute_nodes,
            "storageNodes": storage_nodes,
        },
    })
}

/// Apply the SystemConfiguration for `system` via `kubectl apply -f -`.
pub fn apply(session: &Session, system: &System) -> Result<(), K8sError> {
    let manifest = serde_json::to_vec(&render(system))?;
    session
        .run(
            &CommandSpec::new("kubectl")
                .args(["apply", "-f", "-"])
                .stdin(manifest),
        )
        .map(|_| ())
        .map_err(K8sError::from)
}

/// True if the SystemConfiguration resource currently exists.
pub fn exists(session: &Session) -> bool {
    session
        .query(
            &CommandSpec::new("kubectl")
                .args(["get", RESOURCE, NAME])
                .arg("--no-headers"),
        )
        .is_ok()
}

/// Delete the SystemConfiguration and wait for it to be fully removed.
///
/// Removal can take a while when many compute namespaces are being torn
/// down, so poll until `kubectl get` fails. Nothing to wait for under
/// dry-run — the delete was skipped.
pub fn delete(session: &Session) -> Result<(), K8sError> {
    if !exists(session) {
        return Ok(());
    }

    println!("Deleting SystemConfiguration");
    session.run(&CommandSpec::new("kubectl").args(["delete", RESOURCE, NAME]))?;

    if session.options().dry_run {
        return Ok(());
    }

    while exists(session) {
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
