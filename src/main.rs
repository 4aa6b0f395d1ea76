//! Flux bootstrap
//!
//! Runs one bootstrap pass against the cluster named by `KUBECONFIG`. The
//! workload-reconcile workflow invokes this after it has pushed the workload
//! artifact.
//!
//! Environment:
//! - `KUBECONFIG`: kubeconfig path (first entry used), defaults to `~/.kube/config`
//! - `FLUX_BOOTSTRAP_CONFIG`: cluster configuration YAML
//! - `FLUX_BOOTSTRAP_CONTEXT`: kubeconfig context to use
//! - `FLUX_BOOTSTRAP_TIMEOUT_SECS`: overall deadline
//! - `FLUX_BOOTSTRAP_METRICS_FILE`: write metrics here when done

use anyhow::Context as _;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flux_bootstrap::{
    cluster::{ClusterAccess, KubeConnector},
    config::{BootstrapOptions, ClusterConfig},
    context::ExecutionContext,
    metrics, reconcile_bootstrap,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    info!("Starting Flux bootstrap");

    let config = match std::env::var_os("FLUX_BOOTSTRAP_CONFIG") {
        Some(path) => ClusterConfig::from_file(&path)?,
        None => {
            warn!("FLUX_BOOTSTRAP_CONFIG not set, using default cluster configuration");
            ClusterConfig::default()
        }
    };

    let mut access = ClusterAccess::new(kubeconfig_path()?);
    if let Ok(context) = std::env::var("FLUX_BOOTSTRAP_CONTEXT") {
        access = access.with_context(context);
    }

    let mut ctx = ExecutionContext::background();
    if let Ok(raw) = std::env::var("FLUX_BOOTSTRAP_TIMEOUT_SECS") {
        let secs: u64 = raw
            .parse()
            .with_context(|| format!("invalid FLUX_BOOTSTRAP_TIMEOUT_SECS {:?}", raw))?;
        ctx = ExecutionContext::with_timeout(Duration::from_secs(secs));
    }

    // Ctrl-C / SIGTERM cancel the running waits
    let canceller = ctx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        canceller.cancel();
    });

    let result = reconcile_bootstrap(
        Some(&ctx),
        &KubeConnector::default(),
        &access,
        Some(&config),
        &BootstrapOptions::default(),
    )
    .await;

    if let Some(path) = std::env::var_os("FLUX_BOOTSTRAP_METRICS_FILE") {
        if let Err(e) = export_metrics(Path::new(&path)) {
            warn!("Metrics export failed: {:#}", e);
        }
    }

    let report = result?;
    info!(
        "Flux bootstrap complete (FluxInstance {:?}, OCIRepository {:?})",
        report.instance, report.dependent
    );
    Ok(())
}

/// Write the metrics registry in text exposition format
fn export_metrics(path: &Path) -> anyhow::Result<()> {
    let rendered = metrics::render().context("failed to render metrics")?;
    std::fs::write(path, rendered)
        .with_context(|| format!("failed to write metrics to {:?}", path))
}

/// Resolve the kubeconfig file the same way kubectl does for a single path
fn kubeconfig_path() -> anyhow::Result<PathBuf> {
    if let Some(paths) = std::env::var_os("KUBECONFIG") {
        if let Some(first) = std::env::split_paths(&paths).find(|p| !p.as_os_str().is_empty()) {
            return Ok(first);
        }
    }

    let home = std::env::var_os("HOME").context("neither KUBECONFIG nor HOME is set")?;
    Ok(PathBuf::from(home).join(".kube").join("config"))
}

/// Initialize tracing subscriber
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,flux_bootstrap=debug,kube=warn,hyper=warn")
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal, cancelling bootstrap");
        }
        _ = terminate => {
            info!("Received SIGTERM signal, cancelling bootstrap");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_metrics_writes_textfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flux-bootstrap.prom");
        metrics::RUNS.inc();

        export_metrics(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("flux_bootstrap_runs_total"));
    }

    #[test]
    fn export_metrics_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("flux-bootstrap.prom");

        let err = export_metrics(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to write metrics"));
    }
}
