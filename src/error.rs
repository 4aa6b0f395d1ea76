//! Error types for the Flux bootstrap reconciler

use thiserror::Error;

use crate::wait::WaitCause;

/// Result type for the bootstrap reconciler
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the bootstrap reconciler
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid input (cluster configuration, kubeconfig path)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Building the control-plane or discovery client failed
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// A required API group/version was never served within the budget
    #[error(
        "timed out waiting for API group version {group_version} to be served: {}",
        wait_reason(.cause, .last_error)
    )]
    ReadinessTimeout {
        group_version: String,
        cause: WaitCause,
        #[source]
        last_error: Option<kube::Error>,
    },

    /// Create, get or update of a declarative resource failed
    #[error("failed to {operation} {kind} {namespace}/{name}: {source}")]
    Reconciliation {
        operation: &'static str,
        kind: String,
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    /// The operator-created dependent resource never appeared within the budget
    #[error(
        "timed out waiting for {kind} {namespace}/{name} to exist: {}",
        wait_reason(.cause, .last_error)
    )]
    DependentTimeout {
        kind: String,
        namespace: String,
        name: String,
        cause: WaitCause,
        #[source]
        last_error: Option<kube::Error>,
    },
}

impl Error {
    /// Short label used for the `stage` dimension of the error counter
    pub fn stage_label(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Connectivity(_) => "connect",
            Error::ReadinessTimeout { .. } => "api_readiness",
            Error::Reconciliation { .. } => "reconcile",
            Error::DependentTimeout { .. } => "dependent",
        }
    }
}

/// Last probe error, or the context's own reason when no probe ran
fn wait_reason(cause: &WaitCause, last_error: &Option<kube::Error>) -> String {
    match last_error {
        Some(err) => err.to_string(),
        None => cause.to_string(),
    }
}

/// Returns true when the API server rejected a create because the object exists
pub fn is_already_exists(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 409 && resp.reason == "AlreadyExists")
}

/// Returns true when the API server reported the object as missing
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == 404)
}
