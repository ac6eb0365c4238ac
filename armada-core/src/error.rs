//! Error types for armada-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from configuration and manifest handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No system in the config matches the active Kubernetes context.
    #[error("system '{name}' not found in {path}")]
    SystemNotFound { name: String, path: PathBuf },

    /// No repository entry for the requested module.
    #[error("repository '{name}' not found in {path}")]
    RepositoryNotFound { name: String, path: PathBuf },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
