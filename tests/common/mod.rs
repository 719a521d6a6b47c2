//! Shared utilities for integration and load testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use federation_director::config::DirectorConfig;
use federation_director::http::HttpServer;
use federation_director::lifecycle::Shutdown;
use serde_json::{json, Value};
use tokio::sync::mpsc;

/// A director running on a loopback port.
pub struct TestDirector {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_tx: mpsc::UnboundedSender<DirectorConfig>,
}

impl TestDirector {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestDirector {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a director bound to `addr` with the given config.
pub async fn start_director(addr: SocketAddr, mut config: DirectorConfig) -> TestDirector {
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(200)).await;

    TestDirector {
        addr,
        shutdown,
        config_tx,
    }
}

/// Client that does not follow redirects, so tests can inspect them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Advertisement body with public namespaces.
pub fn registration(name: &str, url: &str, namespaces: &[&str]) -> Value {
    let namespaces: Vec<Value> = namespaces.iter().map(|path| json!({ "path": path })).collect();
    json!({
        "name": name,
        "url": url,
        "namespaces": namespaces,
    })
}
