//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::inject::PathPolicy;

/// Root configuration for the site proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Where origin responses come from.
    pub origin: OriginConfig,

    /// HTML rewriting behaviour.
    pub inject: InjectConfig,

    /// Environment variable names and fallbacks for the injected values.
    pub env: EnvSources,

    /// Content of the configuration error page.
    pub page: PageConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Origin the rewriter sits in front of.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OriginConfig {
    /// Forward every request to an upstream HTTP server.
    Upstream {
        /// Base URL, e.g. "http://127.0.0.1:3000".
        url: String,
    },
    /// Serve files from a local directory.
    Directory {
        /// Root directory of the built site.
        root: String,
    },
}

impl Default for OriginConfig {
    fn default() -> Self {
        OriginConfig::Directory {
            root: "public".to_string(),
        }
    }
}

/// HTML rewriting configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InjectConfig {
    /// Which request paths are considered pages.
    pub path_policy: PathPolicy,
}

/// Ordered environment variable names per injected value.
///
/// The first name holding a non-empty value wins.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvSources {
    pub owner_vars: Vec<String>,
    pub repo_vars: Vec<String>,
    pub token_vars: Vec<String>,

    /// Used when none of `owner_vars` is set.
    pub default_owner: String,

    /// Used when none of `repo_vars` is set.
    pub default_repo: String,
}

impl Default for EnvSources {
    fn default() -> Self {
        Self {
            owner_vars: vec!["REPO_OWNER".to_string(), "GITHUB_OWNER".to_string()],
            repo_vars: vec!["REPO_NAME".to_string(), "GITHUB_REPO".to_string()],
            token_vars: vec!["API_TOKEN".to_string(), "GITHUB_TOKEN".to_string()],
            default_owner: "khalidbhb".to_string(),
            default_repo: "metatopo-data".to_string(),
        }
    }
}

/// Configuration error page content.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PageConfig {
    /// Site name shown in the title and the remediation steps.
    pub site_name: String,

    /// Support e-mail address.
    pub support_email: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            site_name: "METATOPO".to_string(),
            support_email: "bouhabba.igt@gmail.com".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "site_env_proxy=debug,tower_http=debug".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum HTML body size buffered for rewriting, in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.env.owner_vars, vec!["REPO_OWNER", "GITHUB_OWNER"]);
        assert_eq!(config.env.default_repo, "metatopo-data");
        assert_eq!(config.inject.path_policy, PathPolicy::Pages);
    }

    #[test]
    fn test_upstream_origin_and_policy() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [origin]
            kind = "upstream"
            url = "http://127.0.0.1:3000"

            [inject]
            path_policy = "exclude_assets"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.origin,
            OriginConfig::Upstream { url: "http://127.0.0.1:3000".into() }
        );
        assert_eq!(config.inject.path_policy, PathPolicy::ExcludeAssets);
    }
}
