//! Cluster configuration consumed by the bootstrap reconciler

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result};

/// Source directory used when the configuration leaves it blank
pub const DEFAULT_SOURCE_DIRECTORY: &str = "k8s";

/// Host port of the local registry when none is configured
pub const DEFAULT_LOCAL_REGISTRY_PORT: u16 = 5000;

/// Sync interval applied when the configured one is zero or negative
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Subset of the cluster configuration the bootstrap step depends on
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Directory the workload artifact is built from
    #[serde(default)]
    pub source_directory: String,

    /// Whether a local OCI registry runs alongside the cluster
    #[serde(default)]
    pub local_registry_enabled: bool,

    /// Host port the local registry is published on
    #[serde(default)]
    pub local_registry_host_port: Option<u16>,

    /// Flux sync interval in seconds
    #[serde(default)]
    pub sync_interval_secs: i64,
}

impl ClusterConfig {
    /// Parse a cluster configuration document
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw)
            .map_err(|e| Error::Config(format!("Invalid cluster configuration: {}", e)))
    }

    /// Load a cluster configuration document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read cluster configuration {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml_str(&raw)
    }
}

/// Timing knobs for the two polling loops
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// Time between probes
    pub poll_interval: Duration,
    /// Budget for each API group/version readiness wait
    pub api_timeout: Duration,
    /// Budget for the dependent OCIRepository to appear
    pub dependent_timeout: Duration,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            api_timeout: Duration::from_secs(120),
            dependent_timeout: Duration::from_secs(120),
        }
    }
}
