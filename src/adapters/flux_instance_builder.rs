//! FluxInstance builder: derives the desired controller configuration from cluster config

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::adapters::naming;
use crate::config::{
    ClusterConfig, DEFAULT_LOCAL_REGISTRY_PORT, DEFAULT_SOURCE_DIRECTORY, DEFAULT_SYNC_INTERVAL,
};
use crate::crd::{
    DistributionSpec, FluxInstance, FluxInstanceSpec, SyncSpec, FLUX_INSTANCE_NAME, FLUX_NAMESPACE,
};

/// Registry host as seen from inside the cluster
pub const LOCAL_REGISTRY_CLUSTER_HOST: &str = "local-registry";
/// Registry port as seen from inside the cluster
pub const LOCAL_REGISTRY_CLUSTER_PORT: u16 = 5000;
/// Registry host used when no local registry is attached to the cluster
pub const EXTERNAL_REGISTRY_HOST: &str = "localhost";

const FLUX_DISTRIBUTION_VERSION: &str = "2.x";
const FLUX_DISTRIBUTION_REGISTRY: &str = "ghcr.io/fluxcd";
const FLUX_DISTRIBUTION_ARTIFACT: &str =
    "oci://ghcr.io/controlplaneio-fluxcd/flux-operator-manifests";

const SYNC_KIND: &str = "OCIRepository";
const SYNC_REF: &str = "latest";
/// Workload manifests sit at the root of the pushed artifact
pub const SYNC_PATH: &str = "./";
const SYNC_PROVIDER: &str = "generic";

/// Repository name used when the source directory sanitizes to nothing
pub const FALLBACK_PROJECT_NAME: &str = "workloads";

/// Build the FluxInstance the bootstrap step owns
pub fn build_flux_instance(config: &ClusterConfig) -> FluxInstance {
    let (host, port) = resolve_registry_endpoint(config);
    let repository = project_name(&config.source_directory);
    let interval = resolve_sync_interval(config.sync_interval_secs);

    FluxInstance {
        metadata: ObjectMeta {
            name: Some(FLUX_INSTANCE_NAME.to_string()),
            namespace: Some(FLUX_NAMESPACE.to_string()),
            labels: Some(build_labels()),
            ..Default::default()
        },
        spec: FluxInstanceSpec {
            distribution: DistributionSpec {
                version: FLUX_DISTRIBUTION_VERSION.to_string(),
                registry: FLUX_DISTRIBUTION_REGISTRY.to_string(),
                artifact: Some(FLUX_DISTRIBUTION_ARTIFACT.to_string()),
            },
            sync: Some(SyncSpec {
                kind: SYNC_KIND.to_string(),
                url: format!("oci://{}:{}/{}", host, port, repository),
                ref_: SYNC_REF.to_string(),
                path: SYNC_PATH.to_string(),
                provider: Some(SYNC_PROVIDER.to_string()),
                interval: Some(format_interval(interval)),
            }),
        },
    }
}

/// Sync interval, falling back to the default for zero or negative values
pub fn resolve_sync_interval(seconds: i64) -> Duration {
    match u64::try_from(seconds) {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => DEFAULT_SYNC_INTERVAL,
    }
}

/// Registry host and port the Flux source-controller pulls from
pub fn resolve_registry_endpoint(config: &ClusterConfig) -> (&'static str, u16) {
    if config.local_registry_enabled {
        return (LOCAL_REGISTRY_CLUSTER_HOST, LOCAL_REGISTRY_CLUSTER_PORT);
    }

    let port = match config.local_registry_host_port {
        Some(port) if port > 0 => port,
        _ => DEFAULT_LOCAL_REGISTRY_PORT,
    };
    (EXTERNAL_REGISTRY_HOST, port)
}

/// OCI repository name derived from the workload source directory
pub fn project_name(source_directory: &str) -> String {
    let source_directory = if source_directory.trim().is_empty() {
        DEFAULT_SOURCE_DIRECTORY
    } else {
        source_directory
    };
    naming::sanitize(source_directory, FALLBACK_PROJECT_NAME)
}

/// Render a duration the way Flux expects it, e.g. `1m`, `2m30s`, `1h`
pub fn format_interval(interval: Duration) -> String {
    let total = interval.as_secs();
    if total == 0 {
        return format!("{}ms", interval.subsec_millis().max(1));
    }

    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if seconds > 0 {
        out.push_str(&format!("{}s", seconds));
    }
    if interval.subsec_millis() > 0 {
        out.push_str(&format!("{}ms", interval.subsec_millis()));
    }
    out
}

fn build_labels() -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(
        "app.kubernetes.io/managed-by".to_string(),
        "flux-bootstrap".to_string(),
    );
    labels
}
