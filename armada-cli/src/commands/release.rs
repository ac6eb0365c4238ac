//! `armada release` — version the sibling repositories as a unit.
//!
//! A release records, per module, either the tag pointing at HEAD or the
//! commit hash. `create` appends to the manifest; `set` checks the recorded
//! state back out (detached HEAD); `info` prints a release and, when showing
//! the currently-selected one, cross-checks each checkout against it.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use armada_core::release::{
    read_manifest_at, write_manifest_at, Release, ReleaseComponent, LOCAL_MANIFEST_FILE,
    MANIFEST_FILE,
};
use armada_remote::Session;

use crate::git;
use crate::modules::{self, MODULES};
use crate::Globals;

/// The deployer repository's own component name in the manifest.
const DEPLOYER_COMPONENT: &str = "armada";

#[derive(Subcommand, Debug)]
pub enum ReleaseCommand {
    /// List the available releases.
    List,

    /// Show a release's components; with no version, check the checkouts
    /// against the currently selected release.
    Info {
        /// Release version to show.
        #[arg(long)]
        version: Option<String>,
    },

    /// Record the current state of every repository as a new release.
    Create {
        /// Version string for the new release.
        #[arg(long)]
        version: String,

        /// Also create a git tag on this repository.
        #[arg(long)]
        tag: bool,
    },

    /// Check out the recorded commit of every module for a release.
    Set {
        /// Release version to select.
        #[arg(long)]
        version: String,
    },
}

pub fn run(command: ReleaseCommand, globals: &Globals) -> Result<()> {
    match command {
        ReleaseCommand::List => list(),
        ReleaseCommand::Info { version } => info(globals, version),
        ReleaseCommand::Create { version, tag } => create(globals, &version, tag),
        ReleaseCommand::Set { version } => set(globals, &version),
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn list() -> Result<()> {
    let manifest = read_manifest_at(Path::new("."))?;

    println!(
        "Current Version: {}",
        manifest.current_version.as_deref().unwrap_or("[none]")
    );
    println!("Available Versions:");
    for release in &manifest.releases {
        println!("{}", release.version);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// info
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "component")]
    name: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "tag")]
    tag: String,
    #[tabled(rename = "commit")]
    commit: String,
}

fn info(globals: &Globals, version: Option<String>) -> Result<()> {
    let manifest = read_manifest_at(Path::new("."))?;

    let selected = match &version {
        Some(v) => v.clone(),
        None => match &manifest.current_version {
            Some(v) => v.clone(),
            None => return Ok(()),
        },
    };

    let Some(release) = manifest.find(&selected) else {
        bail!("release '{selected}' not found");
    };

    println!("Version: {selected}");
    let rows: Vec<ComponentRow> = release
        .components
        .iter()
        .map(|c| ComponentRow {
            name: c.name.clone(),
            branch: c.branch.clone().unwrap_or_default(),
            tag: c.tag.clone().unwrap_or_default(),
            commit: c.commit.clone().unwrap_or_default(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    // An explicit version is informational only; the current version gets a
    // sanity check of every checkout against the recorded state.
    if version.is_some() {
        return Ok(());
    }

    let session = globals.session();
    check_component(&session, release, DEPLOYER_COMPONENT)?;

    // The component list in the release is authoritative; the static module
    // list may have gained or lost entries since the release was cut.
    let module_list: Vec<String> = release
        .components
        .iter()
        .filter(|c| c.name != DEPLOYER_COMPONENT)
        .map(|c| c.name.clone())
        .collect();

    modules::run_in_modules(&module_list, |module| {
        check_component(&session, release, module)
    })
}

fn check_component(session: &Session, release: &Release, module: &str) -> Result<()> {
    let Some(component) = release.component(module) else {
        return Ok(());
    };

    if let Some(expected) = &component.tag {
        let actual = git::current_tag(session)?;
        if actual != *expected {
            println!(
                "{} tag mismatch for {module}: expected {expected}, found {}",
                "!".yellow(),
                if actual.is_empty() { "[untagged]" } else { &actual }
            );
        }
    } else if let Some(expected) = &component.commit {
        let actual = git::last_commit(session)?;
        if actual != *expected {
            println!(
                "{} commit mismatch for {module}: expected {expected}, found {actual}",
                "!".yellow()
            );
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

fn create(globals: &Globals, version: &str, tag: bool) -> Result<()> {
    let mut manifest = read_manifest_at(Path::new("."))?;

    if manifest.find(version).is_some() {
        bail!("release '{version}' already exists");
    }

    println!("Creating version {version}");

    let session = globals.session();
    if tag {
        println!("Tagging {DEPLOYER_COMPONENT} with '{version}'");
        git::add_tag(&session, version)?;
    }

    let mut components = vec![record_component(&session, DEPLOYER_COMPONENT)?];
    modules::run_in_modules(&MODULES, |module| {
        components.push(record_component(&session, module)?);
        Ok(())
    })?;

    manifest.releases.push(Release {
        version: version.to_string(),
        components,
    });

    // Only the local shadow tracks the operator's selected version; the
    // checked-in manifest never carries one.
    manifest.current_version = Some(version.to_string());
    write_manifest_at(Path::new("."), &manifest, LOCAL_MANIFEST_FILE)?;

    manifest.current_version = None;
    write_manifest_at(Path::new("."), &manifest, MANIFEST_FILE)?;

    Ok(())
}

fn record_component(session: &Session, module: &str) -> Result<ReleaseComponent> {
    let branch = git::current_branch(session)?;
    let commit = git::last_commit(session)?;
    let url = git::repo_url(session)?;
    let tag = git::current_tag(session)?;

    if tag.is_empty() {
        println!("Recording {module} at commit {commit}");
    } else {
        println!("Recording {module} at tag {tag}");
    }

    Ok(ReleaseComponent {
        name: module.to_string(),
        repository: url,
        branch: (!branch.is_empty()).then_some(branch),
        tag: (!tag.is_empty()).then_some(tag.clone()),
        commit: tag.is_empty().then_some(commit),
    })
}

// ---------------------------------------------------------------------------
// set
// ---------------------------------------------------------------------------

fn set(globals: &Globals, version: &str) -> Result<()> {
    let mut manifest = read_manifest_at(Path::new("."))?;

    let Some(release) = manifest.find(version).cloned() else {
        bail!("release '{version}' not found");
    };

    let session = globals.session();
    set_component(&session, &release, DEPLOYER_COMPONENT)?;

    let module_list: Vec<String> = release
        .components
        .iter()
        .filter(|c| c.name != DEPLOYER_COMPONENT)
        .map(|c| c.name.clone())
        .collect();

    modules::run_in_modules(&module_list, |module| {
        set_component(&session, &release, module)
    })?;

    manifest.current_version = Some(version.to_string());
    write_manifest_at(Path::new("."), &manifest, LOCAL_MANIFEST_FILE)?;

    Ok(())
}

/// Check out the recorded tag or commit for `module`, detaching HEAD.
fn set_component(session: &Session, release: &Release, module: &str) -> Result<()> {
    let Some(component) = release.component(module) else {
        bail!("could not find module {module} in release {}", release.version);
    };

    let rev = match (&component.tag, &component.commit) {
        (Some(tag), _) => {
            println!("Setting {module} to tag {tag}");
            tag
        }
        (None, Some(commit)) => {
            println!("Setting {module} to commit {commit}");
            commit
        }
        (None, None) => bail!("component {module} records neither tag nor commit"),
    };

    git::checkout(session, rev)?;
    Ok(())
}
