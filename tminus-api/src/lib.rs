//! # tminus API Server
//!
//! Serves countdown GIFs over HTTP.
//!
//! ## Endpoints
//!
//! - `GET /countdown?date=YYYY-MM-DD` - Countdown GIF (cached, or a placeholder on a miss)
//! - `GET /health` - Liveness and uptime
//! - `GET /api/v1/cache/stats` - Cache and sweep counters
//!
//! ## Example
//!
//! ```rust,ignore
//! use tminus_api::{ApiServer, ApiConfig};
//!
//! let config = ApiConfig::from_env();
//! let server = ApiServer::new(config)?;
//! server.run(([0, 0, 0, 0], 8080)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use tminus_core::error::Result;

/// API server for tminus.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self::with_state(AppState::new(config)?))
    }

    /// Creates a server around prepared state.
    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        create_router(self.state.clone()).layer(TraceLayer::new_for_http())
    }

    /// Runs the server until Ctrl+C, then stops accepting requests and
    /// cancels in-flight sweeps.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("tminus listening on {}", addr);

        let coordinator = self.state.coordinator.clone();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                coordinator.shutdown();
            })
            .await
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl+C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
