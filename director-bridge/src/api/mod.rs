//! Inbound API for Director Bridge
//!
//! HTTP endpoints and a WebSocket that feed bus messages to the scene bridge
//! and report what it has done.

pub mod routes;
pub mod server;
pub mod shared;
pub mod types;
pub mod websocket;

pub use server::{create_shared_state, run_server};
pub use shared::{BridgeCommand, BridgeSnapshot, BridgeStats, SharedState, SharedStateHandle, WsEvent};
pub use types::*;
