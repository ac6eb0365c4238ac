//! Active context discovery and cluster endpoint parsing.

use serde::Deserialize;

use armada_core::ClusterEndpoint;
use armada_remote::{CommandSpec, Session};

use crate::error::K8sError;

#[derive(Debug, Deserialize)]
struct KubeConfig {
    #[serde(default)]
    contexts: Vec<NamedContext>,
    #[serde(default)]
    clusters: Vec<NamedCluster>,
}

#[derive(Debug, Deserialize)]
struct NamedContext {
    name: String,
    context: ContextBody,
}

#[derive(Debug, Deserialize)]
struct ContextBody {
    cluster: String,
}

#[derive(Debug, Deserialize)]
struct NamedCluster {
    name: String,
    cluster: ClusterBody,
}

#[derive(Debug, Deserialize)]
struct ClusterBody {
    server: String,
}

/// The active Kubernetes context name (`kubectl config current-context`).
pub fn current_context(session: &Session) -> Result<String, K8sError> {
    let out = session.query(&CommandSpec::new("kubectl").args(["config", "current-context"]))?;
    Ok(String::from_utf8_lossy(&out).trim_end().to_string())
}

/// The API server URL of the cluster the active context points at.
pub fn cluster_server(session: &Session) -> Result<String, K8sError> {
    let context = current_context(session)?;
    let view = session.query(&CommandSpec::new("kubectl").args(["config", "view"]))?;
    let config: KubeConfig = serde_yaml::from_slice(&view)?;
    server_for_context(&config, &context)
}

/// The API endpoint daemons will be pointed at, parsed from the cluster
/// server URL. Per-system overrides are applied by the caller.
pub fn cluster_endpoint(session: &Session) -> Result<ClusterEndpoint, K8sError> {
    let server = cluster_server(session)?;
    parse_endpoint(&server)
}

fn server_for_context(config: &KubeConfig, context_name: &str) -> Result<String, K8sError> {
    let context = config
        .contexts
        .iter()
        .find(|c| c.name == context_name)
        .ok_or_else(|| K8sError::ContextNotFound {
            name: context_name.to_string(),
        })?;

    let cluster = config
        .clusters
        .iter()
        .find(|c| c.name == context.context.cluster)
        .ok_or_else(|| K8sError::ClusterNotFound {
            name: context.context.cluster.clone(),
        })?;

    Ok(cluster.cluster.server.clone())
}

fn parse_endpoint(server: &str) -> Result<ClusterEndpoint, K8sError> {
    let trimmed = server
        .trim_start_matches("https://")
        .trim_start_matches("http://");

    let (host, port) = trimmed.split_once(':').ok_or_else(|| K8sError::MalformedServer {
        url: server.to_string(),
    })?;
    if host.is_empty() || port.is_empty() {
        return Err(K8sError::MalformedServer {
            url: server.to_string(),
        });
    }

    Ok(ClusterEndpoint {
        host: host.to_string(),
        port: port.trim_end_matches('/').to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_VIEW: &str = "\
apiVersion: v1
kind: Config
contexts:
- name: htx-admin
  context:
    cluster: htx
    user: admin
- name: kind-kind
  context:
    cluster: kind-kind
    user: kind-kind
clusters:
- name: htx
  cluster:
    server: https://10.30.100.2:6443
- name: kind-kind
  cluster:
    server: https://127.0.0.1:40117
";

    #[test]
    fn server_resolves_through_context() {
        let config: KubeConfig = serde_yaml::from_str(CONFIG_VIEW).expect("parse");
        let server = server_for_context(&config, "htx-admin").expect("server");
        assert_eq!(server, "https://10.30.100.2:6443");
    }

    #[test]
    fn unknown_context_is_an_error() {
        let config: KubeConfig = serde_yaml::from_str(CONFIG_VIEW).expect("parse");
        let err = server_for_context(&config, "absent").unwrap_err();
        assert!(matches!(err, K8sError::ContextNotFound { .. }));
    }

    #[test]
    fn dangling_cluster_reference_is_an_error() {
        let yaml = "\
contexts:
- name: broken
  context:
    cluster: ghost
clusters: []
";
        let config: KubeConfig = serde_yaml::from_str(yaml).expect("parse");
        let err = server_for_context(&config, "broken").unwrap_err();
        assert!(matches!(err, K8sError::ClusterNotFound { .. }));
    }

    #[test]
    fn endpoint_parses_host_and_port() {
        let endpoint = parse_endpoint("https://10.30.100.2:6443").expect("parse");
        assert_eq!(endpoint.host, "10.30.100.2");
        assert_eq!(endpoint.port, "6443");
    }

    #[test]
    fn endpoint_without_port_is_an_error() {
        assert!(matches!(
            parse_endpoint("https://10.30.100.2").unwrap_err(),
            K8sError::MalformedServer { .. }
        ));
    }
}
