//! WebSocket handler for bus input and live events
//!
//! Clients send `{"channel": "...", "message": {...}}` text frames, which are
//! queued exactly like `POST /api/input/:channel`. The server pushes a
//! snapshot on connect and an event for every scene it handles.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use super::shared::{BridgeCommand, SharedStateHandle, WsEvent};
use super::types::InboundMessage;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedStateHandle>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Parse a text frame into a bridge command
pub(crate) fn parse_inbound(text: &str) -> Result<BridgeCommand, serde_json::Error> {
    let inbound: InboundMessage = serde_json::from_str(text)?;
    Ok(BridgeCommand::Input {
        channel: inbound.channel,
        message: inbound.message,
    })
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: SharedStateHandle) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before sending the snapshot so no event falls in between
    let mut rx = state.subscribe();

    let initial_event = WsEvent::Snapshot(state.get_snapshot());
    if let Ok(json) = serde_json::to_string(&initial_event) {
        if sender.send(Message::Text(json)).await.is_err() {
            return;
        }
    }

    tracing::info!("WebSocket client connected");

    let inbound_state = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => match parse_inbound(&text) {
                    Ok(cmd) => match inbound_state.send_command(cmd) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!("Bridge command queue is full, dropping WebSocket input");
                        }
                        Err(TrySendError::Closed(_)) => {
                            tracing::error!("Bridge command queue is closed, dropping WebSocket input");
                            break;
                        }
                    },
                    Err(e) => tracing::warn!("Ignoring malformed WebSocket message: {}", e),
                },
                Ok(Message::Close(_)) => {
                    tracing::info!("WebSocket client requested close");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket receive error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Ok(json) = serde_json::to_string(&event) {
                        if sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("WebSocket client lagged, skipped {} events", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    break;
                }
            }
        }
    });

    // Whichever side finishes first ends the connection
    first_to_finish(recv_task, send_task).await;

    tracing::info!("WebSocket client disconnected");
}

/// Wait for either task, then abort the other
async fn first_to_finish(mut a: JoinHandle<()>, mut b: JoinHandle<()>) {
    tokio::select! {
        _ = &mut a => b.abort(),
        _ = &mut b => a.abort(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_inbound_scene() {
        let text = json!({ "channel": "scene", "message": { "name": "s1", "windows": [] } }).to_string();
        match parse_inbound(&text).unwrap() {
            BridgeCommand::Input { channel, message } => {
                assert_eq!(channel, "scene");
                assert_eq!(message["name"], "s1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_inbound_requires_channel() {
        assert!(parse_inbound(r#"{"message": {}}"#).is_err());
        assert!(parse_inbound("not json").is_err());
    }

    #[tokio::test]
    async fn test_other_task_is_aborted() {
        let (parked_tx, parked_rx) = tokio::sync::oneshot::channel::<()>();
        let finished = tokio::spawn(async {});
        let parked = tokio::spawn(async move {
            // Held until the task is dropped
            let _tx = parked_tx;
            std::future::pending::<()>().await;
        });

        first_to_finish(finished, parked).await;

        // Sender dropped by the abort, not by completion
        let dropped = tokio::time::timeout(std::time::Duration::from_secs(1), parked_rx).await;
        assert!(matches!(dropped, Ok(Err(_))));
    }
}
