//! Axum server setup and startup

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};

use super::routes::create_router;
use super::shared::{BridgeCommand, SharedState, SharedStateHandle};

/// Run the API server on the specified port with shared state
///
/// Runs until the shutdown signal fires, then drains open connections.
pub async fn run_server(
    port: u16,
    shared_state: SharedStateHandle,
    mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(shared_state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            tracing::info!("API server shutting down gracefully");
        })
        .await
}

/// Commands the bridge may have waiting before input is refused
pub const COMMAND_QUEUE_CAPACITY: usize = 256;

/// Create a new shared state and command channel
///
/// Returns the shared state handle (for the API server) and the command
/// receiver (for the scene bridge)
pub fn create_shared_state() -> (SharedStateHandle, mpsc::Receiver<BridgeCommand>) {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let state = Arc::new(SharedState::new(tx));
    (state, rx)
}
