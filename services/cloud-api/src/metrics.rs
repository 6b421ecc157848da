//! Prometheus metrics recorded by the service.
//!
//! Without an installed recorder these calls are no-ops.

use metrics::{counter, histogram};

pub fn record_request(endpoint: &'static str) {
    counter!("cloud_requests_total", "endpoint" => endpoint).increment(1);
}

pub fn record_error(endpoint: &'static str, status: u16) {
    counter!(
        "cloud_request_errors_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_upstream_fetch(duration_ms: f64) {
    histogram!("upstream_fetch_duration_ms").record(duration_ms);
}

pub fn record_decode(duration_ms: f64, grids: usize) {
    histogram!("grib_decode_duration_ms").record(duration_ms);
    counter!("grib_grids_decoded_total").increment(grids as u64);
}

/// Record the size of an encoded stream relative to its sample count.
pub fn record_encoding(runs: usize, samples: usize) {
    counter!("rle_runs_total").increment(runs as u64);
    if runs > 0 {
        histogram!("rle_compression_ratio").record(samples as f64 / runs as f64);
    }
}
