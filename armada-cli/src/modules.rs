//! Module sequencing: the fixed deploy order and the helpers that run a
//! closure inside each module's checkout.
//!
//! The modules are sibling git checkouts of this repository, addressed by
//! relative path. `run_in_modules` chdirs into each one and restores the
//! original working directory afterward, pass or fail.

use std::env;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use armada_core::{config, Repository, System};
use armada_remote::{CommandSpec, Session};

use crate::git;

/// Deploy order. Undeploy walks it in reverse.
pub const MODULES: [&str; 5] = [
    "workflow-services",
    "seafs-csi-driver",
    "seafs-operator",
    "keel-sos",
    "keel-dm",
];

/// The module owning the SystemConfiguration resource.
pub const SYSTEM_CONFIG_MODULE: &str = "keel-sos";

/// True if `module` is excluded by the `only` filter. An empty filter
/// permits everything; otherwise substring match, so `armada deploy sos`
/// selects `keel-sos`.
pub fn should_skip_module(module: &str, only: &[String]) -> bool {
    !only.is_empty() && !only.iter().any(|permitted| module.contains(permitted.as_str()))
}

/// Run `run` inside each module directory in order, restoring the working
/// directory between modules. The first error stops the iteration.
pub fn run_in_modules<S, F>(modules: &[S], mut run: F) -> Result<()>
where
    S: AsRef<str>,
    F: FnMut(&str) -> Result<()>,
{
    let cwd = env::current_dir().context("could not determine working directory")?;

    for module in modules {
        let module = module.as_ref();
        env::set_current_dir(module)
            .with_context(|| format!("could not enter module directory '{module}'"))?;

        let result = run(module);

        env::set_current_dir(&cwd)
            .with_context(|| format!("could not return to '{}'", cwd.display()))?;
        result?;
    }

    Ok(())
}

/// The kustomize overlay shared by `repo` and `system`, if any.
pub fn matching_overlay<'a>(repo: &'a Repository, system: &System) -> Option<&'a str> {
    repo.overlays
        .iter()
        .find(|overlay| system.overlays.contains(overlay))
        .map(String::as_str)
}

/// Run `make <target>` in the current module with overlay and build env.
pub fn run_make_command(
    session: &Session,
    repos: &Path,
    system: &System,
    module: &str,
    target: &str,
) -> Result<()> {
    println!("  Running `make {target}` in {module}...");

    let repo = config::find_repository(repos, module)?;
    let mut cmd = CommandSpec::new("make").arg(target);
    if let Some(overlay) = matching_overlay(&repo, system) {
        println!("  Overlay for {module} found: {overlay}");
        cmd = cmd.env("OVERLAY", overlay);
    }
    for env in &repo.env {
        cmd = cmd.env(&env.name, &env.value);
    }

    session.run(&cmd)?;
    Ok(())
}

/// Run `make deploy` in the current module with the image env derived from
/// git state. `kind` systems deploy locally-pushed images and skip the
/// image pinning entirely.
pub fn deploy_module(
    session: &Session,
    repos: &Path,
    system: &System,
    module: &str,
) -> Result<()> {
    let repo = config::find_repository(repos, module)?;
    let overlay = matching_overlay(&repo, system);

    let mut cmd = CommandSpec::new("make").arg("deploy");

    if system.name == "kind" {
        if let Some(overlay) = overlay {
            cmd = cmd.env("OVERLAY", overlay);
        }
    } else {
        println!("  Loading Current Branch...");
        let mut branch = git::current_branch(session)?;
        // Detached HEAD carries no branch name; assume the commit was built
        // on master at some point.
        if branch.is_empty() {
            branch = "master".to_string();
        }
        println!("  Branch: {branch}");

        let url = if branch == "master" {
            repo.master.as_deref()
        } else {
            repo.development.as_deref()
        }
        .ok_or_else(|| {
            anyhow!("repository '{module}' has no image URL for branch '{branch}'")
        })?;

        println!("  Loading Last Commit...");
        let commit = git::last_commit(session)?;
        println!("  Commit: {commit}");

        // The registry pull assumes https and prepends it, so the scheme is
        // dropped from the tag base.
        let image_tag_base = url.trim_start_matches("https://").trim_end_matches('/');

        cmd = cmd
            .env("IMAGE_TAG_BASE", image_tag_base)
            .env("VERSION", &commit);
        if let Some(overlay) = overlay {
            cmd = cmd.env("OVERLAY", overlay);
        }
    }

    for env in &repo.env {
        cmd = cmd.env(&env.name, &env.value);
    }

    println!("  Running Deploy...");
    session.run(&cmd)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
