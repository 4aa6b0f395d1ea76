//! Flux bootstrap reconciler
//!
//! Brings the Flux operator's declarative configuration onto a freshly
//! provisioned cluster: waits for the operator's APIs to be served, upserts the
//! `FluxInstance`, and, when a local registry is attached, marks the generated
//! `OCIRepository` insecure. Every step is idempotent so the caller can re-run
//! it against the same cluster.

pub mod adapters;
pub mod cluster;
pub mod config;
pub mod context;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod reconcilers;
pub mod wait;

pub use error::{Error, Result};
pub use reconcilers::reconcile_bootstrap;
