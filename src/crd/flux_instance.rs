//! FluxInstance Custom Resource (fluxcd.controlplane.io/v1)

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group/version serving `FluxInstance`
pub const FLUX_INSTANCE_GROUP_VERSION: &str = "fluxcd.controlplane.io/v1";

/// Well-known name of the bootstrap-managed `FluxInstance`
pub const FLUX_INSTANCE_NAME: &str = "flux";

/// Namespace the Flux controllers are installed into
pub const FLUX_NAMESPACE: &str = "flux-system";

/// FluxInstance resource specification
#[derive(CustomResource, Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "fluxcd.controlplane.io",
    version = "v1",
    kind = "FluxInstance",
    plural = "fluxinstances",
    singular = "fluxinstance",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct FluxInstanceSpec {
    /// Which Flux build the operator installs
    pub distribution: DistributionSpec,

    /// Source the instance keeps the cluster in sync with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncSpec>,
}

/// Flux distribution selection
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSpec {
    /// Semver range of the Flux release, e.g. `2.x`
    pub version: String,

    /// Container registry hosting the controller images
    pub registry: String,

    /// OCI artifact holding the distribution manifests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
}

/// Sync configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncSpec {
    /// Source kind the operator generates (OCIRepository, GitRepository, Bucket)
    pub kind: String,

    /// Source URL, `oci://host:port/repository` for OCI sources
    pub url: String,

    /// Tag, branch or semver reference
    #[serde(rename = "ref")]
    pub ref_: String,

    /// Path inside the artifact to reconcile
    pub path: String,

    /// Authentication provider for the source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Go-style duration between syncs, e.g. `1m`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

impl super::private::Sealed for FluxInstance {}

impl super::SpecSource for FluxInstance {
    fn copy_spec_into(&self, other: &mut Self) {
        other.spec = self.spec.clone();
    }
}
