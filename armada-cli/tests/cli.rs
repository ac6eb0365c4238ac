//! CLI surface tests. Everything here must run without kubectl, git, or a
//! cluster: help output plus the release subcommands that only read the
//! manifest.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use armada_core::release::{
    write_manifest_at, Release, ReleaseComponent, ReleaseManifest, MANIFEST_FILE,
};

fn armada() -> Command {
    Command::cargo_bin("armada").expect("binary")
}

fn manifest_with(versions: &[&str]) -> ReleaseManifest {
    ReleaseManifest {
        current_version: None,
        releases: versions
            .iter()
            .map(|v| Release {
                version: v.to_string(),
                components: vec![ReleaseComponent {
                    name: "keel-sos".to_string(),
                    repository: "https://github.com/keel-stack/keel-sos".to_string(),
                    branch: Some("master".to_string()),
                    tag: Some(format!("v{v}")),
                    commit: None,
                }],
            })
            .collect(),
    }
}

#[test]
fn help_lists_all_subcommands() {
    armada()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("deploy")
                .and(predicate::str::contains("undeploy"))
                .and(predicate::str::contains("make"))
                .and(predicate::str::contains("install"))
                .and(predicate::str::contains("init"))
                .and(predicate::str::contains("release")),
        );
}

#[test]
fn help_shows_global_flags() {
    armada()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--dry-run")
                .and(predicate::str::contains("--debug"))
                .and(predicate::str::contains("--systems")),
        );
}

#[test]
fn install_help_shows_force_and_no_build() {
    armada()
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--force").and(predicate::str::contains("--no-build")),
        );
}

#[test]
fn unknown_subcommand_fails() {
    armada().arg("launch").assert().failure();
}

#[test]
fn release_list_prints_versions() {
    let dir = TempDir::new().expect("tempdir");
    write_manifest_at(dir.path(), &manifest_with(&["0.1.0", "0.2.0"]), MANIFEST_FILE)
        .expect("write manifest");

    armada()
        .current_dir(dir.path())
        .args(["release", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Current Version: [none]")
                .and(predicate::str::contains("0.1.0"))
                .and(predicate::str::contains("0.2.0")),
        );
}

#[test]
fn release_list_without_manifest_fails() {
    let dir = TempDir::new().expect("tempdir");
    armada()
        .current_dir(dir.path())
        .args(["release", "list"])
        .assert()
        .failure();
}

#[test]
fn release_info_shows_components_for_explicit_version() {
    let dir = TempDir::new().expect("tempdir");
    write_manifest_at(dir.path(), &manifest_with(&["0.1.0"]), MANIFEST_FILE)
        .expect("write manifest");

    armada()
        .current_dir(dir.path())
        .args(["release", "info", "--version", "0.1.0"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Version: 0.1.0")
                .and(predicate::str::contains("keel-sos"))
                .and(predicate::str::contains("v0.1.0")),
        );
}

#[test]
fn release_info_unknown_version_fails() {
    let dir = TempDir::new().expect("tempdir");
    write_manifest_at(dir.path(), &manifest_with(&["0.1.0"]), MANIFEST_FILE)
        .expect("write manifest");

    armada()
        .current_dir(dir.path())
        .args(["release", "info", "--version", "9.9.9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn release_create_rejects_duplicate_version() {
    let dir = TempDir::new().expect("tempdir");
    write_manifest_at(dir.path(), &manifest_with(&["0.1.0"]), MANIFEST_FILE)
        .expect("write manifest");

    armada()
        .current_dir(dir.path())
        .args(["release", "create", "--version", "0.1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
