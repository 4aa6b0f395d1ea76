//! OCIRepository Custom Resource (source.toolkit.fluxcd.io/v1)

use kube::CustomResource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// API group/version serving `OCIRepository`
pub const OCI_REPOSITORY_GROUP_VERSION: &str = "source.toolkit.fluxcd.io/v1";

/// Name the Flux operator gives the OCIRepository generated from `FluxInstance.spec.sync`
pub const OCI_REPOSITORY_NAME: &str = "flux-system";

/// OCIRepository specification
///
/// Only `insecure` is interpreted. All other fields are kept in `extra` so a
/// read-modify-write leaves them exactly as the source-controller wrote them.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[kube(
    group = "source.toolkit.fluxcd.io",
    version = "v1",
    kind = "OCIRepository",
    plural = "ocirepositories",
    namespaced,
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct OCIRepositorySpec {
    /// Allow plain HTTP connections to the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl OCIRepository {
    /// Whether the repository already allows plain HTTP registries
    pub fn is_insecure(&self) -> bool {
        self.spec.insecure.unwrap_or(false)
    }
}
