//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!
//! process environment
//!     → env.rs (ordered names + defaults)
//!     → SiteEnv (resolved once, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::SiteEnv;
pub use loader::{load_config, read_config, ConfigError};
pub use schema::{EnvSources, OriginConfig, PageConfig, ProxyConfig};
