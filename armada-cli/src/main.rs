//! Armada — deployment orchestrator for the keel storage stack.
//!
//! # Usage
//!
//! ```text
//! armada deploy [only...] [--dry-run]
//! armada undeploy [only...] [--dry-run]
//! armada make <target> [only...]
//! armada install [node...] [--no-build] [--force]
//! armada init
//! armada release list|info|create|set
//! ```

mod commands;
mod git;
mod modules;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use armada_core::{config, System};
use armada_remote::{RunOptions, Session};

use commands::{
    deploy::DeployArgs, init::InitArgs, install::InstallArgs, make::MakeArgs,
    release::ReleaseCommand, undeploy::UndeployArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "armada",
    version,
    about = "Build, deploy and install the keel storage stack",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    globals: Globals,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy every module to the current Kubernetes context.
    Deploy(DeployArgs),

    /// Undeploy every module from the current Kubernetes context.
    Undeploy(UndeployArgs),

    /// Run a make target in every module.
    Make(MakeArgs),

    /// Build and install per-node daemons onto compute nodes.
    Install(InstallArgs),

    /// Initialize the cluster: node labels/taints and third-party services.
    Init(InitArgs),

    /// Create or use a release across the sibling repositories.
    Release {
        #[command(subcommand)]
        command: ReleaseCommand,
    },
}

// ---------------------------------------------------------------------------
// Global flags
// ---------------------------------------------------------------------------

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct Globals {
    /// Log every executed command.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Show what would be run without mutating anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Path to the systems config file.
    #[arg(long, global = true, default_value = "config/systems.yaml")]
    pub systems: PathBuf,

    /// Path to the repositories config file.
    #[arg(long, global = true, default_value = "config/repositories.yaml")]
    pub repos: PathBuf,

    /// Path to the daemons config file.
    #[arg(long, global = true, default_value = "config/daemons.yaml")]
    pub daemons: PathBuf,
}

impl Globals {
    pub fn session(&self) -> Session {
        self.session_with_force(false)
    }

    pub fn session_with_force(&self, force: bool) -> Session {
        Session::local(RunOptions {
            debug: self.debug,
            dry_run: self.dry_run,
            force,
        })
    }

    /// Resolve the target system from the active Kubernetes context.
    pub fn load_system(&self, session: &Session) -> Result<System> {
        println!("Retrieving Context...");
        let context =
            armada_k8s::current_context(session).context("could not determine current context")?;
        log::debug!("active kubernetes context: {context}");

        println!("Retrieving System Config...");
        let system = config::find_system(&self.systems, &context)?;
        log::debug!("system config loaded from {}", self.systems.display());

        println!("Target System: {}", system.name);
        Ok(system)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let globals = cli.globals;
    match cli.command {
        Commands::Deploy(args) => args.run(&globals),
        Commands::Undeploy(args) => args.run(&globals),
        Commands::Make(args) => args.run(&globals),
        Commands::Install(args) => args.run(&globals),
        Commands::Init(args) => args.run(&globals),
        Commands::Release { command } => commands::release::run(command, &globals),
    }
}
