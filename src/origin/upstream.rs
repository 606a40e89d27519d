//! Forwarding to an upstream HTTP origin.
//!
//! # Design Decisions
//! - Bodies stream in both directions; only the rewriter buffers
//! - `accept-encoding` is dropped so HTML arrives as plain text
//! - Hop-by-hop headers are stripped both ways
//! - Connection failures map to 502 Bad Gateway

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderMap},
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::sync::Arc;
use url::Url;

use crate::http::X_REQUEST_ID;
use crate::origin::OriginError;

const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// An upstream origin reached over plain HTTP.
#[derive(Clone)]
pub struct Upstream {
    client: Client<HttpConnector, Body>,
    authority: Authority,
    base_path: String,
}

impl Upstream {
    /// Create an upstream from its base URL, e.g. `http://127.0.0.1:3000/site`.
    pub fn new(url: &str) -> Result<Self, OriginError> {
        let (authority, base_path) = parse_base_url(url).map_err(|reason| OriginError::InvalidUrl {
            url: url.to_string(),
            reason,
        })?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            authority,
            base_path,
        })
    }

    /// Map an incoming request URI onto the upstream.
    pub fn target_uri(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        let path_and_query = uri
            .path_and_query()
            .map(PathAndQuery::as_str)
            .unwrap_or("/");

        Ok(Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(format!("{}{}", self.base_path, path_and_query))
            .build()?)
    }
}

/// Split an upstream base URL into its authority and base path.
///
/// Only plain `http` URLs with a host are accepted. The base path loses its
/// trailing slash.
pub fn parse_base_url(raw: &str) -> Result<(Authority, String), String> {
    let parsed = Url::parse(raw).map_err(|e| format!("'{}' is not a valid URL: {}", raw, e))?;
    if parsed.scheme() != "http" {
        return Err(format!("unsupported scheme '{}'", parsed.scheme()));
    }
    let host = parsed
        .host_str()
        .ok_or_else(|| format!("'{}' has no host", raw))?;
    let port = parsed.port_or_known_default().unwrap_or(80);
    let authority: Authority = format!("{}:{}", host, port)
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| e.to_string())?;

    Ok((authority, parsed.path().trim_end_matches('/').to_string()))
}

/// Fallback handler forwarding every request to the upstream.
pub async fn forward(State(upstream): State<Arc<Upstream>>, request: Request<Body>) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let (mut parts, body) = request.into_parts();

    let uri = match upstream.target_uri(&parts.uri) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Cannot map request onto upstream");
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };

    tracing::debug!(request_id = %request_id, method = %parts.method, uri = %uri, "Forwarding to origin");

    strip_hop_by_hop(&mut parts.headers);
    parts.headers.remove(header::HOST);
    parts.headers.remove(header::ACCEPT_ENCODING);
    parts.uri = uri;

    match upstream.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_uri_joins_base_path() {
        let upstream = Upstream::new("http://127.0.0.1:3000/site/").unwrap();
        let uri: Uri = "/docs/index.html?x=1".parse().unwrap();
        assert_eq!(
            upstream.target_uri(&uri).unwrap().to_string(),
            "http://127.0.0.1:3000/site/docs/index.html?x=1"
        );
    }

    #[test]
    fn test_default_port() {
        let upstream = Upstream::new("http://example.com").unwrap();
        let uri: Uri = "/".parse().unwrap();
        assert_eq!(upstream.target_uri(&uri).unwrap().to_string(), "http://example.com:80/");
    }

    #[test]
    fn test_rejects_https_and_garbage() {
        assert!(Upstream::new("https://example.com").is_err());
        assert!(Upstream::new("not a url").is_err());
    }

    #[test]
    fn test_parse_base_url() {
        let (authority, base_path) = parse_base_url("http://localhost:8000/").unwrap();
        assert_eq!(authority.as_str(), "localhost:8000");
        assert_eq!(base_path, "");

        assert!(parse_base_url("https://localhost").unwrap_err().contains("scheme"));
        assert!(parse_base_url("nope").unwrap_err().contains("not a valid URL"));
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, "close".parse().unwrap());
        headers.insert("keep-alive", "timeout=5".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "text/html".parse().unwrap());
        strip_hop_by_hop(&mut headers);
        assert_eq!(headers.len(), 1);
    }
}
