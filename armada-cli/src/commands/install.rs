//! `armada install` — build per-node daemons and converge them onto the
//! compute fleet.

use std::env;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use armada_core::{config, DaemonSpec};
use armada_k8s::{cluster_endpoint, service_account_material, SecretMaterial};
use armada_remote::{CommandSpec, Session};
use armada_sync::{Convergence, FleetReport, NodeTarget};

use crate::modules;
use crate::Globals;

/// Arguments for `armada install`.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Only install onto these compute nodes.
    #[arg(value_name = "node")]
    pub nodes: Vec<String>,

    /// Skip building the daemon binaries.
    #[arg(long)]
    pub no_build: bool,

    /// Push every artifact even when the checksums match.
    #[arg(long)]
    pub force: bool,
}

impl InstallArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let session = globals.session_with_force(self.force);
        self.run_with_session(globals, &session)
    }

    fn run_with_session(&self, globals: &Globals, session: &Session) -> Result<()> {
        let system = globals.load_system(session)?;

        let endpoint = cluster_endpoint(session)
            .context("could not determine cluster endpoint")?
            .with_overrides(&system);
        println!("Found Cluster Endpoint: {endpoint}");

        let daemons = config::load_daemons(&globals.daemons)?;

        let mut targets = Vec::new();
        for (storage, computes) in &system.storage_nodes {
            println!(" Check clients of storage node {storage}");
            for compute in computes {
                if self.should_skip_node(compute) {
                    continue;
                }
                targets.push(NodeTarget::new(compute.clone(), Some(storage.clone())));
            }
        }
        for compute in &system.external_computes {
            if self.should_skip_node(compute) {
                continue;
            }
            targets.push(NodeTarget::new(compute.clone(), None));
        }

        let mut failed_nodes = 0usize;
        for daemon in &daemons {
            let material = self.load_material(session, daemon)?;

            modules::run_in_modules(&[daemon.repository.as_str()], |module| {
                println!("Checking module {module}");

                // The build runs at the module root; only the staging of
                // artifacts happens from the daemon's own directory.
                if !self.no_build {
                    build_daemon(session, daemon)?;
                }

                if let Some(path) = &daemon.path {
                    env::set_current_dir(path).with_context(|| {
                        format!("could not enter daemon directory '{}'", path.display())
                    })?;
                }

                let staging =
                    env::current_dir().context("could not determine staging directory")?;
                let mut engine = Convergence::new(session, daemon, &endpoint, staging);
                if let Some(material) = &material {
                    engine = engine
                        .with_token(material.token.clone())
                        .with_cert(material.cert.clone());
                }

                let report = engine.converge_fleet(&targets);
                print_report(&daemon.name, &report);
                failed_nodes += report.failures.len();
                Ok(())
            })?;
        }

        if failed_nodes > 0 {
            bail!("{failed_nodes} node(s) failed to converge");
        }
        Ok(())
    }

    fn should_skip_node(&self, node: &str) -> bool {
        !self.nodes.is_empty() && !self.nodes.iter().any(|n| n == node)
    }

    fn load_material(
        &self,
        session: &Session,
        daemon: &DaemonSpec,
    ) -> Result<Option<SecretMaterial>> {
        let Some(account) = &daemon.service_account else {
            return Ok(None);
        };

        println!("Loading Service Account Cert & Token");
        println!("  Secret: {}/{}", account.name, account.namespace);
        let material = service_account_material(session, account)
            .with_context(|| format!("could not load secret for daemon '{}'", daemon.name))?;
        println!("  Loaded");
        Ok(Some(material))
    }
}

/// Compile the daemon binary with its configured build command.
fn build_daemon(session: &Session, daemon: &DaemonSpec) -> Result<()> {
    let Some(build_cmd) = &daemon.build_cmd else {
        return Ok(());
    };

    let mut parts = build_cmd.split_whitespace();
    let Some(program) = parts.next() else {
        return Ok(());
    };

    println!("  Compiling {}...", daemon.unit_name());
    session.run(&CommandSpec::new(program).args(parts))?;
    Ok(())
}

fn print_report(daemon: &str, report: &FleetReport) {
    for outcome in &report.outcomes {
        if outcome.updated.is_empty() {
            println!("  {} {} already up to date", "✓".green(), outcome.node);
        } else {
            let updated: Vec<String> = outcome.updated.iter().map(ToString::to_string).collect();
            println!(
                "  {} {} updated: {}",
                "✓".green(),
                outcome.node,
                updated.join(", ")
            );
        }
    }
    for failure in &report.failures {
        println!("  {} {}: {}", "✗".red(), failure.node, failure.error);
    }

    if report.all_converged() {
        println!("{} converged on all nodes", daemon);
    } else {
        println!(
            "{} failed on {} node(s)",
            daemon,
            report.failures.len()
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;

    use armada_remote::{ExecOutput, Executor, RunOptions};

    const CONFIG_VIEW: &str = "\
contexts:
- name: kind
  context:
    cluster: kind
clusters:
- name: kind
  cluster:
    server: https://127.0.0.1:6443
";

    /// Answers the kubectl discovery reads and records every command along
    /// with the working directory it ran from.
    struct Recorder {
        executed: Arc<Mutex<Vec<(String, PathBuf)>>>,
    }

    impl Executor for Recorder {
        fn run(&self, command: &CommandSpec) -> io::Result<ExecOutput> {
            let display = command.display();
            let cwd = env::current_dir()?;
            self.executed.lock().expect("lock").push((display.clone(), cwd));

            let stdout: Vec<u8> = if display == "kubectl config current-context" {
                b"kind\n".to_vec()
            } else if display == "kubectl config view" {
                CONFIG_VIEW.as_bytes().to_vec()
            } else {
                Vec::new()
            };
            Ok(ExecOutput {
                code: Some(0),
                stdout,
                stderr: Vec::new(),
            })
        }
    }

    #[test]
    fn builds_in_module_root_before_entering_daemon_dir() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("keel-dm/daemons/mover")).expect("module dirs");
        fs::write(dir.path().join("keel-dm/daemons/mover/keel-mover"), b"bin").expect("binary");

        fs::write(
            dir.path().join("systems.yaml"),
            "systems:\n  - name: kind\n    storage_nodes:\n      stor-01: [compute-01]\n",
        )
        .expect("systems");
        fs::write(
            dir.path().join("daemons.yaml"),
            "daemons:\n  - name: keel-mover\n    bin: keel-mover\n    \
             build_cmd: make build-daemon\n    repository: keel-dm\n    path: daemons/mover\n",
        )
        .expect("daemons");

        let globals = Globals {
            debug: false,
            dry_run: false,
            systems: dir.path().join("systems.yaml"),
            repos: dir.path().join("repositories.yaml"),
            daemons: dir.path().join("daemons.yaml"),
        };
        let args = InstallArgs {
            nodes: Vec::new(),
            no_build: false,
            force: false,
        };

        let executed = Arc::new(Mutex::new(Vec::new()));
        let session = Session::new(
            Box::new(Recorder {
                executed: Arc::clone(&executed),
            }),
            RunOptions::default(),
        );

        let original = env::current_dir().expect("cwd");
        env::set_current_dir(dir.path()).expect("enter tempdir");
        let result = args.run_with_session(&globals, &session);
        env::set_current_dir(original).expect("restore cwd");
        result.expect("install");

        let executed = executed.lock().expect("lock").clone();
        let build = executed
            .iter()
            .position(|(c, _)| c == "make build-daemon")
            .expect("build ran");
        let first_remote = executed
            .iter()
            .position(|(c, _)| c.starts_with("ssh"))
            .expect("remote step ran");
        assert!(build < first_remote, "the build must precede remote steps");
        assert!(
            executed[build].1.ends_with("keel-dm"),
            "the build runs at the module root, got {}",
            executed[build].1.display()
        );

        let (_, push_dir) = executed
            .iter()
            .find(|(c, _)| c.starts_with("scp"))
            .expect("push ran");
        assert!(
            push_dir.ends_with("daemons/mover"),
            "artifacts stage from the daemon directory, got {}",
            push_dir.display()
        );
    }
}
