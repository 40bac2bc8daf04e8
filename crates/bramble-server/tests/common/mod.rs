//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Response, header::SET_COOKIE, redirect};
use tempfile::TempDir;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use bramble_server::{Server, ServerConfig};
use bramble_session::{Manager, ManagerConfig, ProviderRegistry};

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client configured for this server. Redirects are not followed.
    pub client: Client,
    /// Session manager shared with the server.
    pub sessions: Arc<Manager>,
    /// Upload directory.
    pub temp_dir: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a new test server with default configuration.
    pub async fn start() -> Result<Self> {
        Self::start_with(|config| config, ManagerConfig::new()).await
    }

    /// Start a test server, adjusting the server and session configuration.
    pub async fn start_with(
        configure: impl FnOnce(ServerConfig) -> ServerConfig,
        session_config: ManagerConfig,
    ) -> Result<Self> {
        let temp_dir = TempDir::new()?;

        // Find an available port
        let addr = find_available_port().await?;

        let registry = ProviderRegistry::with_builtin();
        let sessions = Arc::new(Manager::new(&registry, session_config)?);

        let config = configure(
            ServerConfig::new()
                .with_bind_address(addr)
                .with_request_logging(false)
                .with_upload_dir(temp_dir.path()),
        );

        // Start server in background
        let server = Server::new(config, sessions.clone());
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let _ = server
                .run_until(async move {
                    let _ = rx.await;
                })
                .await;
        });

        // Wait for server to be ready
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            sessions,
            temp_dir,
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get a GET request builder.
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url(), path))
    }

    /// Get a POST request builder.
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(format!("{}{}", self.base_url(), path))
    }

    /// Check if server is healthy.
    pub async fn health(&self) -> Result<bool> {
        let resp = self.get("/health").send().await?;
        Ok(resp.status().is_success())
    }

    /// Stop the server and wait for it to drain.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            timeout(Duration::from_secs(5), handle).await??;
        }
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// The `name=value` pair of the response's `Set-Cookie`, if any.
pub fn cookie_pair(response: &Response) -> Option<String> {
    let value = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    value.split(';').next().map(|pair| pair.trim().to_string())
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
