//! Error types for armada-k8s.

use thiserror::Error;

use armada_remote::ExecError;

/// All errors that can arise from kubectl collaboration.
#[derive(Debug, Error)]
pub enum K8sError {
    /// kubectl could not be run or exited non-zero.
    #[error("kubectl error: {0}")]
    Exec(#[from] ExecError),

    /// `kubectl config view` output did not parse.
    #[error("failed to parse kubectl config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Secret JSON did not parse.
    #[error("failed to parse secret JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Secret data was not valid base64.
    #[error("failed to decode secret data: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The current context is not present in the kubectl config.
    #[error("current context '{name}' not found in kubectl config")]
    ContextNotFound { name: String },

    /// The context references a cluster the config doesn't define.
    #[error("cluster '{name}' not found in kubectl config")]
    ClusterNotFound { name: String },

    /// The cluster server URL has no `host:port` to extract.
    #[error("malformed cluster server URL '{url}'")]
    MalformedServer { url: String },

    /// The secret exists but lacks an expected data key.
    #[error("secret '{secret}' has no '{key}' data")]
    SecretKeyMissing { secret: String, key: String },
}
