//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router around the configured origin
//! - Wire up middleware (request ID, tracing, metrics, timeout, HTML rewriting)
//! - Bind server to listener
//! - Stop on the shutdown broadcast

use axum::{middleware, Router};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ProxyConfig, SiteEnv};
use crate::http::request::MakeRequestUuidV4;
use crate::inject::{rewrite, RewriteState};
use crate::observability::metrics;
use crate::origin::{origin_router, OriginError};

/// HTTP server for the site proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and site values.
    pub fn new(config: ProxyConfig, env: SiteEnv) -> Result<Self, OriginError> {
        let origin = origin_router(&config.origin)?;
        let state = RewriteState::new(
            env,
            config.page.clone(),
            config.inject.path_policy,
            config.security.max_body_size,
        );

        let router = Self::build_router(&config, origin, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, origin: Router, state: RewriteState) -> Router {
        origin
            .layer(middleware::from_fn_with_state(state, rewrite))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(middleware::from_fn(metrics::track_requests))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server, accepting connections until shutdown is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use metrics_exporter_prometheus::PrometheusBuilder;

    use crate::config::OriginConfig;
    use crate::http::X_REQUEST_ID;

    #[tokio::test]
    async fn test_response_carries_request_id() {
        let mut config = ProxyConfig::default();
        config.origin = OriginConfig::Directory {
            root: "/nonexistent-site-root".into(),
        };
        let env = SiteEnv {
            owner: "o".into(),
            repo: "r".into(),
            token: Some("t".into()),
        };
        let server = HttpServer::new(config, env).unwrap();

        let response = server
            .router()
            .oneshot(Request::builder().uri("/missing.html").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[test]
    fn test_directory_origin_records_final_status() {
        let root = std::env::temp_dir().join(format!("site-env-proxy-metrics-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("index.html"), "<html><head></head></html>").unwrap();

        let mut config = ProxyConfig::default();
        config.origin = OriginConfig::Directory {
            root: root.to_string_lossy().into_owned(),
        };
        let env = SiteEnv {
            owner: "o".into(),
            repo: "r".into(),
            token: None,
        };
        let router = HttpServer::new(config, env).unwrap().router();

        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (page, missing) = ::metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let page = router
                    .clone()
                    .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
                    .await
                    .unwrap();
                let missing = router
                    .oneshot(Request::builder().uri("/missing.html").body(Body::empty()).unwrap())
                    .await
                    .unwrap();
                (page.status(), missing.status())
            })
        });
        std::fs::remove_dir_all(&root).ok();

        // Config error page rendered by the rewriter, then a plain 404
        assert_eq!(page, StatusCode::OK);
        assert_eq!(missing, StatusCode::NOT_FOUND);

        let rendered = handle.render();
        assert!(rendered.contains(r#"site_env_proxy_requests_total{status="200"} 1"#));
        assert!(rendered.contains(r#"site_env_proxy_requests_total{status="404"} 1"#));
        assert!(rendered.contains("site_env_proxy_request_duration_seconds_count 2"));
        assert!(rendered.contains(r#"site_env_proxy_rewrites_total{outcome="missing_token"} 1"#));
    }
}
