//! Reconciliation steps of the Flux bootstrap

pub mod bootstrap;
pub mod dependent;
pub mod discovery;
pub mod upsert;

pub use bootstrap::{reconcile_bootstrap, BootstrapReport, BootstrapStage};
pub use dependent::{ensure_dependent_insecure, DependentOutcome};
pub use discovery::wait_for_group_version;
pub use upsert::{upsert, UpsertOutcome};
