//! The rewriting middleware.
//!
//! Mounted with `axum::middleware::from_fn_with_state`; `next` yields the
//! origin response.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderMap, HeaderValue},
        Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::config::{PageConfig, SiteEnv};
use crate::http::X_REQUEST_ID;
use crate::inject::html::{env_script, inject_after_head_tag};
use crate::inject::{error_page, PathPolicy, RewriteOutcome};
use crate::observability::metrics;

/// Immutable state shared by every invocation.
#[derive(Clone)]
pub struct RewriteState {
    pub env: Arc<SiteEnv>,
    pub page: Arc<PageConfig>,
    pub path_policy: PathPolicy,
    /// Upper bound on buffered HTML bodies.
    pub max_body_size: usize,
}

impl RewriteState {
    pub fn new(env: SiteEnv, page: PageConfig, path_policy: PathPolicy, max_body_size: usize) -> Self {
        Self {
            env: Arc::new(env),
            page: Arc::new(page),
            path_policy,
            max_body_size,
        }
    }
}

pub async fn rewrite(
    State(state): State<RewriteState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // 1. Only page paths are candidates
    if !state.path_policy.should_rewrite(request.uri().path()) {
        metrics::record_rewrite(RewriteOutcome::SkippedPath);
        return next.run(request).await;
    }

    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    // 2. Origin response
    let response = next.run(request).await;

    // 3. Only HTML responses are rewritten
    if !is_html(response.headers()) {
        metrics::record_rewrite(RewriteOutcome::SkippedContentType);
        return response;
    }

    let env = &state.env;
    tracing::info!(
        request_id = %request_id,
        owner = %env.owner,
        repo = %env.repo,
        has_token = env.has_token(),
        "Environment check"
    );

    // 4. Without a token the page cannot work; replace it
    if !env.has_token() {
        tracing::warn!(request_id = %request_id, "API token missing, serving configuration error page");
        metrics::record_rewrite(RewriteOutcome::MissingToken);
        return config_error_response(env, &state.page);
    }

    // 5. Splice the script into the buffered body
    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read origin HTML body");
            return (StatusCode::BAD_GATEWAY, "Failed to read origin response").into_response();
        }
    };

    let snippet = env_script(env);
    let (body, outcome) = match inject_after_head_tag(&bytes, snippet.as_bytes()) {
        Some(rewritten) => (Body::from(rewritten), RewriteOutcome::Injected),
        None => (Body::from(bytes), RewriteOutcome::HeadTagMissing),
    };

    tracing::debug!(request_id = %request_id, outcome = outcome.as_str(), "HTML rewritten");
    metrics::record_rewrite(outcome);

    // Length and validators describe the origin bytes, not these
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::ETAG);
    parts.headers.remove(header::LAST_MODIFIED);
    disable_caching(&mut parts.headers);

    Response::from_parts(parts, body)
}

/// Returns true if the content type declares an HTML document.
pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
}

/// Overwrite the headers that keep clients and intermediaries from caching.
pub fn disable_caching(headers: &mut HeaderMap) {
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
}

fn config_error_response(env: &SiteEnv, page: &PageConfig) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"))],
        error_page::render(env, page),
    )
        .into_response()
}
