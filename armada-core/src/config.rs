//! YAML configuration loaders.
//!
//! Three config files drive a run, all read relative to the deployer
//! repository root (paths are overridable from the CLI):
//!
//! ```text
//! config/systems.yaml       — target systems and node topology
//! config/repositories.yaml  — module image URLs, overlays, build env
//! config/daemons.yaml       — per-node daemon specs
//! ```
//!
//! Configuration errors are fatal: they abort the run before any remote
//! action is taken.

use std::path::Path;

use crate::error::{io_err, ConfigError};
use crate::types::{
    DaemonConfigFile, DaemonSpec, Repository, RepositoryConfigFile, System, SystemConfigFile,
    ThirdPartyService,
};

fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Find the system matching `context` (by name or alias) in the systems file.
pub fn find_system(path: &Path, context: &str) -> Result<System, ConfigError> {
    let config: SystemConfigFile = load_yaml(path)?;
    config
        .systems
        .into_iter()
        .find(|s| s.matches(context))
        .ok_or_else(|| ConfigError::SystemNotFound {
            name: context.to_string(),
            path: path.to_path_buf(),
        })
}

/// Find the repository entry for `module` in the repositories file.
pub fn find_repository(path: &Path, module: &str) -> Result<Repository, ConfigError> {
    let config: RepositoryConfigFile = load_yaml(path)?;
    config
        .repositories
        .into_iter()
        .find(|r| r.name == module)
        .ok_or_else(|| ConfigError::RepositoryNotFound {
            name: module.to_string(),
            path: path.to_path_buf(),
        })
}

/// Third-party services installed during cluster init.
pub fn third_party_services(path: &Path) -> Result<Vec<ThirdPartyService>, ConfigError> {
    let config: RepositoryConfigFile = load_yaml(path)?;
    Ok(config.third_party_services)
}

/// Load all daemon specs, in file order.
pub fn load_daemons(path: &Path) -> Result<Vec<DaemonSpec>, ConfigError> {
    let config: DaemonConfigFile = load_yaml(path)?;
    Ok(config.daemons)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SYSTEMS_YAML: &str = "\
systems:
  - name: kind
    overlays: [kind]
    workers: [kind-worker, kind-worker2]
    storage_nodes:
      kind-worker2: [kind-worker3]
  - name: htx
    aliases: [htx-lab]
    overlays: [htx]
    k8s_host: 10.30.107.247
    k8s_port: \"6443\"
    storage_nodes:
      stor-01: [compute-01, compute-02]
      stor-02: [compute-03]
    external_computes: [compute-ext-01]
";

    const REPOS_YAML: &str = "\
repositories:
  - name: keel-sos
    overlays: [kind, htx]
    master: https://ghcr.io/keel-stack/keel-sos
    development: https://ghcr.io/keel-stack/keel-sos-dev
    env:
      - name: IMAGE_PULL_POLICY
        value: Always
  - name: keel-dm
    master: https://ghcr.io/keel-stack/keel-dm
third_party_services:
  - name: cert-manager
    url: https://example.com/cert-manager.yaml
    wait_cmd: kubectl wait --for=condition=Available deploy -n cert-manager --all
";

    const DAEMONS_YAML: &str = "\
daemons:
  - name: mover
    bin: mover-bin
    build_cmd: make build-daemon
    repository: keel-dm
    path: daemons/mover
    service_account:
      name: mover
      namespace: keel-dm-system
    extra_args: --verbosity=2
    environment:
      - name: DATA_PLANE
        value: fabric0
  - name: probe
    repository: keel-sos
    skip_storage_node_name: true
";

    fn write_config(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn finds_system_by_name_and_alias() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, "systems.yaml", SYSTEMS_YAML);

        let by_name = find_system(&path, "htx").expect("by name");
        assert_eq!(by_name.name, "htx");
        let by_alias = find_system(&path, "htx-lab").expect("by alias");
        assert_eq!(by_alias.name, "htx");
    }

    #[test]
    fn unknown_system_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, "systems.yaml", SYSTEMS_YAML);
        let err = find_system(&path, "nope").unwrap_err();
        assert!(matches!(err, ConfigError::SystemNotFound { .. }));
    }

    #[test]
    fn topology_parses_storage_and_external_nodes() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, "systems.yaml", SYSTEMS_YAML);
        let system = find_system(&path, "htx").expect("system");
        assert_eq!(system.storage_nodes["stor-01"], vec!["compute-01", "compute-02"]);
        assert_eq!(system.external_computes, vec!["compute-ext-01"]);
        assert_eq!(system.k8s_port.as_deref(), Some("6443"));
    }

    #[test]
    fn finds_repository_and_build_env() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, "repositories.yaml", REPOS_YAML);
        let repo = find_repository(&path, "keel-sos").expect("repo");
        assert_eq!(repo.env[0].name, "IMAGE_PULL_POLICY");
        assert!(find_repository(&path, "missing").is_err());
    }

    #[test]
    fn third_party_services_parse() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, "repositories.yaml", REPOS_YAML);
        let services = third_party_services(&path).expect("services");
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "cert-manager");
        assert!(services[0].helm_cmd.is_none());
    }

    #[test]
    fn daemons_parse_in_file_order() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, "daemons.yaml", DAEMONS_YAML);
        let daemons = load_daemons(&path).expect("daemons");
        assert_eq!(daemons.len(), 2);
        assert_eq!(daemons[0].name, "mover");
        assert_eq!(daemons[0].service_account.as_ref().map(|s| s.namespace.as_str()),
            Some("keel-dm-system"));
        assert!(daemons[1].bin.is_none());
        assert!(daemons[1].skip_storage_node_name);
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, "daemons.yaml", "daemons: {not: a list}");
        let err = load_daemons(&path).unwrap_err();
        match err {
            ConfigError::Parse { path: p, .. } => assert!(p.ends_with("daemons.yaml")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("absent.yaml");
        let err = load_daemons(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
