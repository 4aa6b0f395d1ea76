//! Adapters turning cluster configuration into Kubernetes resources

pub mod flux_instance_builder;
pub mod naming;
