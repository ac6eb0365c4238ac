//! Release manifest types and persistence.
//!
//! # Storage layout
//!
//! ```text
//! <repo root>/
//!   release_manifest.yaml   (checked in — never carries current_version)
//!   .release_manifest.yaml  (local shadow — tracks the operator's
//!                            currently-selected version)
//! ```
//!
//! Reads merge the two files, preferring whichever knows more releases; this
//! lets a fresh checkout pick up releases created elsewhere while keeping the
//! locally-selected version out of version control.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

/// Checked-in manifest filename.
pub const MANIFEST_FILE: &str = "release_manifest.yaml";
/// Local shadow manifest filename.
pub const LOCAL_MANIFEST_FILE: &str = ".release_manifest.yaml";

/// The recorded state of one module at release time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseComponent {
    pub name: String,
    pub repository: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Set when HEAD carried a tag at release time; otherwise `commit` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// One release: a version string plus the per-module pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub version: String,
    #[serde(default)]
    pub components: Vec<ReleaseComponent>,
}

impl Release {
    pub fn component(&self, name: &str) -> Option<&ReleaseComponent> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Root of the release manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReleaseManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
    #[serde(default)]
    pub releases: Vec<Release>,
}

impl ReleaseManifest {
    pub fn find(&self, version: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.version == version)
    }
}

fn load_manifest(path: &Path) -> Result<ReleaseManifest, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read the merged release manifest from `dir`.
///
/// The checked-in file must exist. If it records more releases than the local
/// shadow (or the shadow is absent), the shadow is refreshed from it and the
/// checked-in view wins; otherwise the shadow wins, preserving
/// `current_version`.
pub fn read_manifest_at(dir: &Path) -> Result<ReleaseManifest, ConfigError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let manifest = load_manifest(&manifest_path)?;

    let local_path = dir.join(LOCAL_MANIFEST_FILE);
    let local = match load_manifest(&local_path) {
        Ok(local) => local,
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            ReleaseManifest::default()
        }
        Err(err) => return Err(err),
    };

    if manifest.releases.len() > local.releases.len() {
        write_manifest_at(dir, &manifest, LOCAL_MANIFEST_FILE)?;
        return Ok(manifest);
    }

    Ok(local)
}

/// Serialize `manifest` to `<dir>/<file>`.
pub fn write_manifest_at(
    dir: &Path,
    manifest: &ReleaseManifest,
    file: &str,
) -> Result<(), ConfigError> {
    let path = dir.join(file);
    let yaml = serde_yaml::to_string(manifest)?;
    std::fs::write(&path, yaml).map_err(|e| io_err(&path, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
