//! Read-only REST API over a completed run.
//!
//! Provides two GET endpoints:
//! - `/summary`: battery, seasonal tables, and annual report
//! - `/timesteps`: result rows with optional index range filtering

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::runner::{RunOutput, RunSummary};
use crate::sim::types::TimestepResult;

pub use types::{ErrorResponse, TimestepRecord, TimestepsQuery};

/// Immutable application state shared across all request handlers.
///
/// Built once from a finished run and wrapped in `Arc`; nothing mutates it.
pub struct AppState {
    pub summary: RunSummary,
    /// Per-timestep results in input order.
    pub results: Vec<TimestepResult>,
}

impl From<RunOutput> for AppState {
    fn from(output: RunOutput) -> Self {
        Self {
            summary: output.summary(),
            results: output.results,
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/summary", get(handlers::get_summary))
        .route("/timesteps", get(handlers::get_timesteps))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, router(state)).await
}
