//! Origin subsystem: produces the responses the rewriter sees.
//!
//! # Data Flow
//! ```text
//! OriginConfig::Upstream  → upstream.rs (hyper client, streamed bodies)
//! OriginConfig::Directory → tower_http ServeDir (index.html on directories)
//! ```

pub mod upstream;

use axum::Router;
use thiserror::Error;
use tower_http::services::ServeDir;

use crate::config::OriginConfig;

/// Error type for origin setup.
#[derive(Debug, Error)]
pub enum OriginError {
    #[error("invalid upstream URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Build the router that answers every request from the configured origin.
pub fn origin_router(config: &OriginConfig) -> Result<Router, OriginError> {
    let router = match config {
        OriginConfig::Upstream { url } => {
            let upstream = upstream::Upstream::new(url)?;
            tracing::info!(upstream = %url, "Using upstream origin");
            Router::new()
                .fallback(upstream::forward)
                .with_state(std::sync::Arc::new(upstream))
        }
        OriginConfig::Directory { root } => {
            tracing::info!(root = %root, "Serving origin from directory");
            Router::new()
                .fallback_service(ServeDir::new(root).append_index_html_on_directories(true))
        }
    };
    Ok(router)
}
