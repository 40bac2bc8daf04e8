//! HTTP server for Bramble.
//!
//! Serves a handful of session-backed routes on top of
//! [`bramble_session::Manager`]:
//!
//! - `/login` and `/logout` bind a user name to the caller's session
//! - `/count` keeps a per-session visit counter
//! - `/upload` stores multipart file uploads
//! - `/middleware` demonstrates the composable [`Middleware`] chain
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bramble_server::{AppState, Server, ServerConfig};
//! use bramble_session::{Manager, ManagerConfig, ProviderRegistry};
//!
//! let registry = ProviderRegistry::with_builtin();
//! let sessions = Arc::new(Manager::new(&registry, ManagerConfig::new())?);
//! let gc = sessions.spawn_gc();
//!
//! let server = Server::new(ServerConfig::new(), sessions);
//! server.run_until(shutdown_signal()).await?;
//! gc.shutdown().await;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use middleware::{DEFAULT_CHAIN, Middleware, apply_middlewares, request_logging_middleware};
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use bramble_session::Manager;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The Bramble HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a new server around a session manager.
    pub fn new(config: ServerConfig, sessions: Arc<Manager>) -> Self {
        Self {
            state: AppState::new(config, sessions),
        }
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        use axum::routing::{get, post};

        Router::new()
            .merge(routes::health_routes())
            .route(
                "/ping",
                get(routes::ping_get_handler).post(routes::ping_post_handler),
            )
            .route(
                "/login",
                get(routes::login_handler).post(routes::login_form_handler),
            )
            .route("/logout", post(routes::logout_handler))
            .route("/count", get(routes::count_handler))
            .merge(routes::upload_routes(&self.state))
            .merge(routes::middleware_routes())
            // Request logging (inner layer, sees the final status)
            .layer(axum::middleware::from_fn_with_state(
                self.state.clone(),
                middleware::request_logging_middleware,
            ))
            .layer(TimeoutLayer::new(self.state.config.request_timeout))
            // TraceLayer for detailed HTTP tracing
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server on the configured address until the process exits.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.serve(addr, std::future::pending()).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        self.serve(addr, std::future::pending()).await
    }

    /// Run the server on the configured address until `shutdown` resolves,
    /// then drain in-flight requests and return.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.bind_address;
        self.serve(addr, shutdown).await
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }

    async fn serve<F>(self, addr: SocketAddr, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        info!("Starting server on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        info!("Server stopped");
        Ok(())
    }
}
