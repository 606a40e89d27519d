//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, origin and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{OriginConfig, ProxyConfig};
use crate::origin::upstream::parse_base_url;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check the configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    match &config.origin {
        OriginConfig::Upstream { url } => {
            if let Err(message) = parse_base_url(url) {
                errors.push(ValidationError::new("origin.url", message));
            }
        }
        OriginConfig::Directory { root } => {
            if root.trim().is_empty() {
                errors.push(ValidationError::new("origin.root", "must not be empty"));
            }
        }
    }

    for (field, names) in [
        ("env.owner_vars", &config.env.owner_vars),
        ("env.repo_vars", &config.env.repo_vars),
        ("env.token_vars", &config.env.token_vars),
    ] {
        if names.is_empty() {
            errors.push(ValidationError::new(field, "must list at least one variable"));
        } else if names.iter().any(|n| n.trim().is_empty()) {
            errors.push(ValidationError::new(field, "contains a blank variable name"));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
