//! Custom resources read and written during bootstrap
//!
//! Neither CRD is owned here: `FluxInstance` is installed by the Flux operator
//! chart and `OCIRepository` by the Flux source-controller. The types only model
//! the fields the bootstrap reconciler reads or writes.

mod flux_instance;
mod oci_repository;

pub use flux_instance::*;
pub use oci_repository::*;

use crate::cluster::ManagedResource;

/// Resources the upsert engine can reconcile by copying their spec
///
/// Sealed: the set of supported kinds is closed and a kind outside it is
/// rejected at compile time.
pub trait SpecSource: ManagedResource + private::Sealed {
    /// Overwrite `other`'s spec with this object's spec, leaving metadata and status alone
    fn copy_spec_into(&self, other: &mut Self);
}

pub(crate) mod private {
    pub trait Sealed {}
}
