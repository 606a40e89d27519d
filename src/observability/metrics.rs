//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_env_proxy_requests_total` (counter): requests by status
//! - `site_env_proxy_request_duration_seconds` (histogram): latency distribution
//! - `site_env_proxy_rewrites_total` (counter): rewriter outcomes

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::inject::RewriteOutcome;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(status: u16, start: Instant) {
    counter!("site_env_proxy_requests_total", "status" => status.to_string()).increment(1);
    histogram!("site_env_proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Middleware counting every response with its final status.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    record_request(response.status().as_u16(), start);
    response
}

/// Record what the rewriter did with a response.
pub fn record_rewrite(outcome: RewriteOutcome) {
    counter!("site_env_proxy_rewrites_total", "outcome" => outcome.as_str()).increment(1);
}
