//! JSON leaderboard API.
//!
//! - `GET /api/ping` liveness check
//! - `POST /api/result` submit `{score, userName}`
//! - `GET /api/result` top scores, highest first

pub mod error;
mod handlers;
pub mod types;

use axum::{routing::get, Router};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::leaderboard::{Leaderboard, DEFAULT_TOP_N};

/// Largest `?limit=` a caller may ask for
pub const MAX_TOP_N: usize = 100;

#[derive(Clone, Debug)]
pub struct AppState {
    pub leaderboard: Leaderboard,
    pub top_n: usize,
}

impl AppState {
    pub fn new(leaderboard: Leaderboard) -> Self {
        Self {
            leaderboard,
            top_n: DEFAULT_TOP_N,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/ping", get(handlers::ping))
        .route(
            "/result",
            get(handlers::list_results).post(handlers::submit_result),
        );

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("leaderboard listening on http://{addr}");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
