//! Patching of the OCIRepository the Flux operator generates

use kube::Resource;
use tracing::{debug, info, warn};

use crate::cluster::ResourceClient;
use crate::config::BootstrapOptions;
use crate::context::ExecutionContext;
use crate::crd::{OCIRepository, FLUX_NAMESPACE, OCI_REPOSITORY_NAME};
use crate::error::is_not_found;
use crate::wait::poll_until_ready;
use crate::{Error, Result};

/// What the patcher did to the dependent resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentOutcome {
    /// `spec.insecure` was flipped to true
    Patched,
    /// Already insecure, nothing written
    AlreadyInsecure,
    /// Local registry disabled, the patcher was not run
    Skipped,
}

/// Wait for the operator-created OCIRepository and allow plain HTTP pulls on it.
///
/// Never creates the object; creation belongs to the Flux operator.
pub async fn ensure_dependent_insecure<C>(
    ctx: &ExecutionContext,
    client: &C,
    options: &BootstrapOptions,
) -> Result<DependentOutcome>
where
    C: ResourceClient,
{
    let kind = OCIRepository::kind(&()).to_string();

    info!("Waiting for {} {}/{} to be created", kind, FLUX_NAMESPACE, OCI_REPOSITORY_NAME);

    let kind_label = kind.as_str();
    let mut repository: OCIRepository = poll_until_ready(
        ctx,
        options.dependent_timeout,
        options.poll_interval,
        "OCIRepository",
        || async move {
            let fetched: std::result::Result<OCIRepository, kube::Error> =
                client.get(FLUX_NAMESPACE, OCI_REPOSITORY_NAME).await;
            match &fetched {
                Err(e) if !is_not_found(e) => warn!(
                    "Fetching {} {}/{} failed: {}",
                    kind_label, FLUX_NAMESPACE, OCI_REPOSITORY_NAME, e
                ),
                _ => {}
            }
            fetched
        },
    )
    .await
    .map_err(|expired| Error::DependentTimeout {
        kind: kind.clone(),
        namespace: FLUX_NAMESPACE.to_string(),
        name: OCI_REPOSITORY_NAME.to_string(),
        cause: expired.cause,
        last_error: expired.last_error,
    })?;

    if repository.is_insecure() {
        debug!(
            "{} {}/{} already allows insecure registries",
            kind, FLUX_NAMESPACE, OCI_REPOSITORY_NAME
        );
        return Ok(DependentOutcome::AlreadyInsecure);
    }

    repository.spec.insecure = Some(true);

    client
        .replace(&repository)
        .await
        .map_err(|source| Error::Reconciliation {
            operation: "update",
            kind: kind.clone(),
            namespace: FLUX_NAMESPACE.to_string(),
            name: OCI_REPOSITORY_NAME.to_string(),
            source,
        })?;

    info!("Marked {} {}/{} insecure", kind, FLUX_NAMESPACE, OCI_REPOSITORY_NAME);
    Ok(DependentOutcome::Patched)
}
