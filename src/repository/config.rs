// src/repository/config.rs

//! Repository layout and Release metadata

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Repository configuration
///
/// Every (distribution, component, architecture) triple gets one
/// `dists/<dist>/<comp>/binary-<arch>/` index directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub origin: String,
    pub label: String,
    pub description: String,
    pub architectures: Vec<String>,
    pub components: Vec<String>,
    pub distributions: Vec<String>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            origin: "aptpool".to_string(),
            label: "aptpool".to_string(),
            description: "aptpool Debian repository".to_string(),
            architectures: vec!["amd64".to_string()],
            components: vec!["main".to_string()],
            distributions: vec!["stable".to_string(), "testing".to_string()],
        }
    }
}

impl RepositoryConfig {
    /// Load a JSON configuration file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading repository configuration from {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self = serde_json::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate().map_err(|reason| Error::Config {
            path: path.to_path_buf(),
            reason,
        })?;

        Ok(config)
    }

    /// Check that the layout lists are usable
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (key, values) in [
            ("architectures", &self.architectures),
            ("components", &self.components),
            ("distributions", &self.distributions),
        ] {
            if values.is_empty() {
                return Err(format!("{key} must not be empty"));
            }
            if values.iter().any(|v| v.is_empty() || v.contains('/')) {
                return Err(format!("{key} contains an invalid entry"));
            }
        }
        Ok(())
    }

    /// Component used when none is given
    pub fn default_component(&self) -> &str {
        self.components.first().map(String::as_str).unwrap_or("main")
    }
}
