//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use site_env_proxy::config::{OriginConfig, ProxyConfig, SiteEnv};
use site_env_proxy::{HttpServer, Shutdown};

/// A canned origin response.
#[derive(Clone)]
pub struct Canned {
    pub content_type: &'static str,
    pub body: &'static str,
}

/// Start a mock origin answering every path with the response `route` picks.
///
/// Returns the address it listens on.
pub async fn start_mock_origin<F>(route: F) -> SocketAddr
where
    F: Fn(&str) -> Canned + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let route = std::sync::Arc::new(route);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let route = route.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]);
                        let path = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let canned = route(&path);
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nCache-Control: max-age=60\r\nConnection: close\r\n\r\n{}",
                            canned.content_type,
                            canned.body.len(),
                            canned.body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start the proxy in front of `origin` and return its address.
pub async fn start_proxy(origin: SocketAddr, env: SiteEnv, shutdown: &Shutdown) -> SocketAddr {
    let mut config = ProxyConfig::default();
    config.origin = OriginConfig::Upstream {
        url: format!("http://{}", origin),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, env).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    addr
}

pub fn site_env(token: Option<&str>) -> SiteEnv {
    SiteEnv {
        owner: "khalidbhb".into(),
        repo: "metatopo-data".into(),
        token: token.map(String::from),
    }
}
