//! Create-or-update of declarative resources

use kube::{Resource, ResourceExt};
use tracing::{debug, info, instrument};

use crate::cluster::ResourceClient;
use crate::crd::SpecSource;
use crate::error::is_already_exists;
use crate::{Error, Result};

/// Which branch an upsert took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Create `desired`, or copy its spec onto the existing object and update it.
///
/// Only "already exists" on create leads to the update branch; any other
/// failure is returned as is. The update sends the `resourceVersion` that was
/// just read and is not retried on conflict.
#[instrument(skip(client, desired), fields(kind = %K::kind(&()), name = %desired.name_any()))]
pub async fn upsert<C, K>(client: &C, desired: &K) -> Result<UpsertOutcome>
where
    C: ResourceClient,
    K: SpecSource,
{
    let kind = K::kind(&()).to_string();
    let name = desired.name_any();
    let namespace = desired.namespace().unwrap_or_default();

    let wrap = |operation: &'static str, source: kube::Error| Error::Reconciliation {
        operation,
        kind: kind.clone(),
        namespace: namespace.clone(),
        name: name.clone(),
        source,
    };

    match client.create(desired).await {
        Ok(_) => {
            info!("Created {} {}/{}", kind, namespace, name);
            return Ok(UpsertOutcome::Created);
        }
        Err(e) if is_already_exists(&e) => {
            debug!("{} {}/{} already exists, updating", kind, namespace, name);
        }
        Err(e) => return Err(wrap("create", e)),
    }

    let mut existing: K = client
        .get(&namespace, &name)
        .await
        .map_err(|e| wrap("get", e))?;

    desired.copy_spec_into(&mut existing);

    client
        .replace(&existing)
        .await
        .map_err(|e| wrap("update", e))?;

    info!("Updated {} {}/{}", kind, namespace, name);
    Ok(UpsertOutcome::Updated)
}
