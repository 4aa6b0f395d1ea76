//! Readiness gate on API discovery

use tracing::info;

use crate::cluster::DiscoveryClient;
use crate::config::BootstrapOptions;
use crate::context::ExecutionContext;
use crate::wait::poll_until_ready;
use crate::{Error, Result};

/// Wait until the API server serves `group_version`.
///
/// Probes on every `options.poll_interval` tick, the first one a full tick
/// after the call, until discovery succeeds or `options.api_timeout` (capped by
/// the context deadline) elapses.
pub async fn wait_for_group_version<D>(
    ctx: &ExecutionContext,
    discovery: &D,
    group_version: &str,
    options: &BootstrapOptions,
) -> Result<()>
where
    D: DiscoveryClient + ?Sized,
{
    info!(group_version, "Waiting for API group version to be served");

    poll_until_ready(
        ctx,
        options.api_timeout,
        options.poll_interval,
        group_version,
        || discovery.server_resources_for_group_version(group_version),
    )
    .await
    .map_err(|expired| Error::ReadinessTimeout {
        group_version: group_version.to_string(),
        cause: expired.cause,
        last_error: expired.last_error,
    })?;

    info!(group_version, "API group version is served");
    Ok(())
}
