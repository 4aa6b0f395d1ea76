//! Prometheus metrics definitions and text rendering

use prometheus::{
    register_counter, register_counter_vec, register_histogram, Counter, CounterVec, Encoder,
    Histogram, TextEncoder,
};

lazy_static::lazy_static! {
    /// Total number of bootstrap invocations
    pub static ref RUNS: Counter = register_counter!(
        "flux_bootstrap_runs_total",
        "Total number of bootstrap invocations"
    ).unwrap();

    /// Total number of failed bootstrap invocations by failing stage
    pub static ref ERRORS: CounterVec = register_counter_vec!(
        "flux_bootstrap_errors_total",
        "Total number of failed bootstrap invocations",
        &["stage"]
    ).unwrap();

    /// Bootstrap duration histogram
    pub static ref DURATION: Histogram = register_histogram!(
        "flux_bootstrap_duration_seconds",
        "Duration of bootstrap invocations in seconds",
        vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]
    ).unwrap();

    /// Probes issued by the polling loops
    pub static ref POLLS: CounterVec = register_counter_vec!(
        "flux_bootstrap_polls_total",
        "Number of probes issued while waiting",
        &["target"]
    ).unwrap();
}

/// Encode every registered metric in the Prometheus text format
pub fn render() -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder.encode(&metric_families, &mut buffer)?;

    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("metrics output is not UTF-8: {}", e)))
}
