//! `armada init` — one-time cluster preparation: node labels/taints and
//! third-party services.

use anyhow::{Context, Result};
use clap::Args;

use armada_core::{config, System, ThirdPartyService};
use armada_k8s::nodes;
use armada_remote::{CommandSpec, Session};

use crate::Globals;

const MANAGER_LABELS: &[&str] = &["keel.manager=true"];
const STORAGE_LABELS: &[&str] = &["keel.node=true"];
const STORAGE_TAINTS: &[&str] = &["keel.node=true:NoSchedule"];

/// Arguments for `armada init`.
#[derive(Args, Debug)]
pub struct InitArgs {}

impl InitArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let session = globals.session();
        let system = globals.load_system(&session)?;

        apply_labels_taints(&session, &system)?;

        for service in config::third_party_services(&globals.repos)? {
            install_service(&session, &service)
                .with_context(|| format!("could not install '{}'", service.name))?;
        }

        Ok(())
    }
}

fn apply_labels_taints(session: &Session, system: &System) -> Result<()> {
    let owned = |entries: &[&str]| entries.iter().map(|e| e.to_string()).collect::<Vec<_>>();

    println!(
        "Applying manager labels to worker nodes: {}...",
        system.workers.join(", ")
    );
    for node in &system.workers {
        nodes::label(session, node, &owned(MANAGER_LABELS))?;
    }

    let storage: Vec<_> = system.storage_nodes.keys().cloned().collect();
    println!(
        "Applying storage labels and taints to storage nodes: {}...",
        storage.join(", ")
    );
    for node in &storage {
        nodes::label(session, node, &owned(STORAGE_LABELS))?;
        nodes::taint(session, node, &owned(STORAGE_TAINTS))?;
    }

    Ok(())
}

fn install_service(session: &Session, service: &ThirdPartyService) -> Result<()> {
    println!("Installing {}...", service.name);

    if let Some(url) = &service.url {
        session.run(&CommandSpec::new("kubectl").args(["apply", "-f", url]))?;
    }
    if let Some(helm_cmd) = &service.helm_cmd {
        session.run(&CommandSpec::new("bash").arg("-c").arg(helm_cmd))?;
    }
    if let Some(wait_cmd) = &service.wait_cmd {
        println!("  Waiting for {} to become ready...", service.name);
        session.run(&CommandSpec::new("bash").arg("-c").arg(wait_cmd))?;
    }

    Ok(())
}
