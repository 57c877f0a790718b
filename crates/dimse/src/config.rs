//! Configuration types for the SCP service

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::MAX_MOVE_CONTEXTS;

/// Configuration for the SCP service core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScpConfig {
    /// Local Application Entity Title, stamped into query responses
    #[serde(default = "default_local_aet")]
    pub local_aet: String,

    /// Directory scanned for persisted work-item records
    #[serde(default = "default_instance_dir")]
    pub instance_dir: PathBuf,

    /// Directory where inbound C-STORE datasets are written
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Known C-MOVE destinations, keyed by destination AE title
    #[serde(default)]
    pub destinations: HashMap<String, RemoteNode>,

    /// Maximum number of presentation contexts announced per C-MOVE
    #[serde(default = "default_max_move_contexts")]
    pub max_move_contexts: usize,
}

/// Configuration for a remote DICOM node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteNode {
    /// Remote Application Entity Title
    pub ae_title: String,

    /// Remote host address
    pub host: String,

    /// Remote port
    pub port: u16,
}

impl Default for ScpConfig {
    fn default() -> Self {
        Self {
            local_aet: default_local_aet(),
            instance_dir: default_instance_dir(),
            storage_dir: default_storage_dir(),
            destinations: HashMap::new(),
            max_move_contexts: default_max_move_contexts(),
        }
    }
}

impl ScpConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> crate::error::Result<Self> {
        let config: ScpConfig = toml::from_str(text)
            .map_err(|e| crate::error::DimseError::config(format!("TOML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve a move destination by AE title
    ///
    /// AE titles are space-padded on the wire; lookup ignores trailing
    /// padding on the requested name.
    pub fn destination(&self, name: &str) -> Option<&RemoteNode> {
        self.destinations.get(name.trim_end())
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.local_aet.is_empty() || self.local_aet.len() > 16 {
            return Err(crate::error::DimseError::config(
                "Local AE title must be 1-16 characters",
            ));
        }

        for (name, node) in &self.destinations {
            node.validate().map_err(|e| {
                crate::error::DimseError::config(format!("Destination '{}': {}", name, e))
            })?;
        }

        if self.max_move_contexts == 0 {
            return Err(crate::error::DimseError::config(
                "max_move_contexts must be greater than 0",
            ));
        }

        // Ensure working directories exist
        for dir in [&self.instance_dir, &self.storage_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    crate::error::DimseError::config(format!(
                        "Failed to create directory '{}': {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(())
    }
}

impl RemoteNode {
    /// Create a new remote node configuration
    pub fn new(ae_title: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            ae_title: ae_title.into(),
            host: host.into(),
            port,
        }
    }

    /// Validate the remote node configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.ae_title.is_empty() || self.ae_title.len() > 16 {
            return Err(crate::error::DimseError::config(
                "Remote AE title must be 1-16 characters",
            ));
        }

        if self.host.is_empty() {
            return Err(crate::error::DimseError::config("Remote host cannot be empty"));
        }

        if self.port == 0 {
            return Err(crate::error::DimseError::config(
                "Remote port must be greater than 0",
            ));
        }

        Ok(())
    }
}

// Default value functions
fn default_local_aet() -> String {
    "CADENCE_SCP".to_string()
}

fn default_instance_dir() -> PathBuf {
    PathBuf::from("./tmp/instances")
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./tmp/storage")
}

fn default_max_move_contexts() -> usize {
    MAX_MOVE_CONTEXTS
}
