//! Prometheus metrics for the Flux bootstrap reconciler
//!
//! Collectors live in the default registry; `render` encodes them in the text
//! exposition format for the textfile collector.

pub mod prometheus;

pub use self::prometheus::*;
