//! Static site proxy that injects site configuration into HTML pages.

pub mod config;
pub mod http;
pub mod inject;
pub mod lifecycle;
pub mod observability;
pub mod origin;

pub use config::{ProxyConfig, SiteEnv};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
