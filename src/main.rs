//! Site environment proxy.
//!
//! Serves a static site (from a directory or an upstream server) and injects
//! the repository owner, name and API token into every HTML page.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                  SITE ENV PROXY                      │
//!                 │                                                      │
//!  Client Request │  ┌─────────┐   ┌──────────┐   ┌────────┐            │
//!  ───────────────┼─▶│  http   │──▶│  inject  │──▶│ origin │────────────┼──▶ Upstream
//!                 │  │ server  │   │ rewriter │   │        │            │    or directory
//!  Client Response│  └─────────┘   └──────────┘   └────────┘            │
//!  ◀──────────────┼── (script after <head> / config error page)         │
//!                 │                                                      │
//!                 │  config (TOML + env) · observability · lifecycle     │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use site_env_proxy::config::{
    read_config, validation::validate_config, ConfigError, OriginConfig, ProxyConfig, SiteEnv,
};
use site_env_proxy::lifecycle::{signals, Shutdown};
use site_env_proxy::observability::{logging, metrics};
use site_env_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "site-env-proxy")]
#[command(about = "Serve a static site with configuration injected into its HTML", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Forward to this upstream origin
    #[arg(long, conflicts_with = "origin_dir")]
    origin_url: Option<String>,

    /// Serve this directory as the origin
    #[arg(long)]
    origin_dir: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(url) = self.origin_url {
            config.origin = OriginConfig::Upstream { url };
        }
        if let Some(root) = self.origin_dir {
            config.origin = OriginConfig::Directory { root };
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("site-env-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let env = SiteEnv::from_process_env(&config.env);
    tracing::info!(
        owner = %env.owner,
        repo = %env.repo,
        has_token = env.has_token(),
        "Site environment resolved"
    );
    if !env.has_token() {
        tracing::warn!(
            vars = ?config.env.token_vars,
            "No API token set; HTML pages will show the configuration error page"
        );
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        path_policy = ?config.inject.path_policy,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    let server = HttpServer::new(config, env)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
