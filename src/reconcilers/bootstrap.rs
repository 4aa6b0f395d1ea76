//! Bootstrap orchestration: from cluster configuration to a configured Flux instance

use std::time::Instant;
use tracing::{debug, error, info, instrument};

use crate::adapters::flux_instance_builder;
use crate::cluster::{ClusterAccess, ClusterConnector};
use crate::config::{BootstrapOptions, ClusterConfig};
use crate::context::ExecutionContext;
use crate::crd::{FLUX_INSTANCE_GROUP_VERSION, OCI_REPOSITORY_GROUP_VERSION};
use crate::metrics::prometheus::{DURATION, ERRORS, RUNS};
use crate::reconcilers::dependent::{ensure_dependent_insecure, DependentOutcome};
use crate::reconcilers::discovery::wait_for_group_version;
use crate::reconcilers::upsert::{upsert, UpsertOutcome};
use crate::{Error, Result};

/// Linear progress of one bootstrap invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    Init,
    ClientReady,
    PrimaryApiReady,
    Upserted,
    SecondaryApiReady,
    PatchedOrSkipped,
    Done,
}

impl BootstrapStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BootstrapStage::Init => "Init",
            BootstrapStage::ClientReady => "ClientReady",
            BootstrapStage::PrimaryApiReady => "PrimaryApiReady",
            BootstrapStage::Upserted => "Upserted",
            BootstrapStage::SecondaryApiReady => "SecondaryApiReady",
            BootstrapStage::PatchedOrSkipped => "PatchedOrSkipped",
            BootstrapStage::Done => "Done",
        }
    }
}

/// What a successful bootstrap did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    pub instance: UpsertOutcome,
    pub dependent: DependentOutcome,
}

/// Bootstrap the Flux configuration onto a cluster.
///
/// Waits for the FluxInstance API, upserts the FluxInstance derived from
/// `config`, waits for the OCIRepository API and, with local-registry
/// integration enabled, marks the generated OCIRepository insecure. Steps run
/// strictly in order and stop at the first failure; earlier side effects are
/// kept. A missing `ctx` means no deadline beyond the per-wait budgets.
#[instrument(skip_all, fields(kubeconfig = %access.kubeconfig.display()))]
pub async fn reconcile_bootstrap<C>(
    ctx: Option<&ExecutionContext>,
    connector: &C,
    access: &ClusterAccess,
    config: Option<&ClusterConfig>,
    options: &BootstrapOptions,
) -> Result<BootstrapReport>
where
    C: ClusterConnector,
{
    let start = Instant::now();
    RUNS.inc();

    let ctx = ctx.cloned().unwrap_or_default();
    let result = run(&ctx, connector, access, config, options).await;

    let duration = start.elapsed().as_secs_f64();
    DURATION.observe(duration);

    match &result {
        Ok(report) => info!(
            "Bootstrap finished in {:.2}s: FluxInstance {:?}, OCIRepository {:?}",
            duration, report.instance, report.dependent
        ),
        Err(e) => {
            ERRORS.with_label_values(&[e.stage_label()]).inc();
            error!("Bootstrap failed after {:.2}s: {}", duration, e);
        }
    }

    result
}

async fn run<C>(
    ctx: &ExecutionContext,
    connector: &C,
    access: &ClusterAccess,
    config: Option<&ClusterConfig>,
    options: &BootstrapOptions,
) -> Result<BootstrapReport>
where
    C: ClusterConnector,
{
    let config =
        config.ok_or_else(|| Error::Config("cluster configuration is required".to_string()))?;
    if access.kubeconfig.as_os_str().is_empty() {
        return Err(Error::Config("kubeconfig path is required".to_string()));
    }
    advance(BootstrapStage::Init);

    let client = connector.connect(access).await?;
    advance(BootstrapStage::ClientReady);

    wait_for_group_version(ctx, &client, FLUX_INSTANCE_GROUP_VERSION, options).await?;
    advance(BootstrapStage::PrimaryApiReady);

    let desired = flux_instance_builder::build_flux_instance(config);
    let instance = upsert(&client, &desired).await?;
    advance(BootstrapStage::Upserted);

    wait_for_group_version(ctx, &client, OCI_REPOSITORY_GROUP_VERSION, options).await?;
    advance(BootstrapStage::SecondaryApiReady);

    let dependent = if config.local_registry_enabled {
        ensure_dependent_insecure(ctx, &client, options).await?
    } else {
        debug!("Local registry disabled, leaving OCIRepository untouched");
        DependentOutcome::Skipped
    };
    advance(BootstrapStage::PatchedOrSkipped);

    advance(BootstrapStage::Done);
    Ok(BootstrapReport {
        instance,
        dependent,
    })
}

fn advance(stage: BootstrapStage) {
    debug!(stage = stage.as_str(), "Bootstrap stage reached");
}
