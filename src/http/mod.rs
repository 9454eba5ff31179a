//! HTTP surface
//!
//! - `POST /api/v1/transactions` - create, answers `{transactionID, status}`
//! - `GET /api/v1/transactions/{id}` - lookup, 404 `{detail}` when unknown
//! - `GET /api/v1/metrics` - `{tps, p99_latency, total_requests}`

use std::future::Future;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::pipeline::Pipeline;

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::TransactionResponse;

/// Build the router for a pipeline
pub fn router(pipeline: Pipeline) -> Router {
    Router::new()
        .route("/api/v1/transactions", post(handlers::create_transaction))
        .route("/api/v1/transactions/{id}", get(handlers::get_transaction))
        .route("/api/v1/metrics", get(handlers::get_metrics))
        .with_state(pipeline)
}

/// Serve the API until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, pipeline: Pipeline, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }
    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown)
        .await
}
