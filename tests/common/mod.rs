//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use library_catalog::config::CatalogConfig;
use library_catalog::{CatalogStore, HttpServer, Shutdown};

/// A catalog server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<CatalogStore>,
    shutdown: Shutdown,
}

impl TestServer {
    /// Absolute URL for a path below the controller base.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}/api/library{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server over the default seed catalog.
#[allow(dead_code)]
pub async fn start_seeded_server() -> TestServer {
    serve(Arc::new(CatalogStore::seeded())).await
}

/// Start a server whose catalog holds exactly `seed`.
pub async fn start_server(seed: &[&str]) -> TestServer {
    serve(Arc::new(CatalogStore::new(seed.iter().copied()))).await
}

async fn serve(store: Arc<CatalogStore>) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::with_store(CatalogConfig::default(), store.clone()).unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.signal();

    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    // Give the accept loop a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        store,
        shutdown,
    }
}

/// Client that never reuses connections across servers.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
