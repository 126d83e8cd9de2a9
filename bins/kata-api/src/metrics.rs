// Prometheus counters for the kata API

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    pub static ref SUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "kata_submissions_total",
        "Submissions forwarded to the execution service",
        &["outcome"]
    )
    .expect("submissions counter registers once");
    pub static ref POLLS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "kata_polls_total",
        "Job status requests forwarded to the execution service",
        &["outcome"]
    )
    .expect("polls counter registers once");
    pub static ref CATALOG_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "kata_catalog_lookups_total",
        "Problem catalog lookups",
        &["outcome"]
    )
    .expect("catalog counter registers once");
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            format!("failed to encode metrics: {}", e),
        );
    }
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        String::from_utf8_lossy(&buffer).into_owned(),
    )
}
