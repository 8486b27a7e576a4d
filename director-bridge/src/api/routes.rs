//! API route definitions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use tokio::sync::mpsc::error::TrySendError;

use super::shared::{BridgeCommand, BridgeSnapshot, BridgeStats, SharedStateHandle};
use super::types::*;
use crate::scene::SceneOutcome;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Create the API router with all endpoints
pub fn create_router(state: SharedStateHandle) -> Router {
    Router::new()
        // Status endpoints
        .route("/api/status", get(status_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/snapshot", get(snapshot_handler))
        .route("/api/scene", get(last_scene_handler))
        // Bus input
        .route("/api/input/:channel", post(input_handler))
        // Group cache
        .route("/api/groups/refresh", post(refresh_groups_handler))
        // WebSocket endpoint for bus input and live events
        .route("/ws", get(super::websocket::ws_handler))
        .with_state(state)
}

fn queue(state: &SharedStateHandle, cmd: BridgeCommand) -> ApiResult<()> {
    state.send_command(cmd).map_err(|e| {
        let message = match e {
            TrySendError::Full(_) => {
                tracing::warn!("Bridge command queue is full, refusing input");
                "Scene bridge is busy"
            }
            TrySendError::Closed(_) => {
                tracing::error!("Bridge command queue is closed");
                "Scene bridge is not running"
            }
        };
        (StatusCode::SERVICE_UNAVAILABLE, Json(ApiError::unavailable(message)))
    })
}

// ============================================================================
// Status Handlers
// ============================================================================

async fn status_handler(State(state): State<SharedStateHandle>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

async fn stats_handler(State(state): State<SharedStateHandle>) -> Json<BridgeStats> {
    Json(state.get_snapshot().stats)
}

async fn snapshot_handler(State(state): State<SharedStateHandle>) -> Json<BridgeSnapshot> {
    Json(state.get_snapshot())
}

async fn last_scene_handler(State(state): State<SharedStateHandle>) -> ApiResult<Json<SceneOutcome>> {
    state
        .get_snapshot()
        .last_scene
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, Json(ApiError::not_found("No scene handled yet"))))
}

// ============================================================================
// Input Handlers
// ============================================================================

async fn input_handler(
    State(state): State<SharedStateHandle>,
    Path(channel): Path<String>,
    Json(message): Json<serde_json::Value>,
) -> ApiResult<(StatusCode, Json<QueuedResponse>)> {
    if !message.is_object() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request("Message body must be a JSON object")),
        ));
    }

    queue(&state, BridgeCommand::Input { channel: channel.clone(), message })?;
    Ok((
        StatusCode::ACCEPTED,
        Json(QueuedResponse {
            message: "Message queued".to_string(),
            channel: Some(channel),
        }),
    ))
}

async fn refresh_groups_handler(State(state): State<SharedStateHandle>) -> ApiResult<(StatusCode, Json<QueuedResponse>)> {
    queue(&state, BridgeCommand::RefreshGroups)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(QueuedResponse {
            message: "Group refresh requested".to_string(),
            channel: None,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use super::*;
    use crate::api::shared::SharedState;

    fn router() -> (Router, SharedStateHandle, mpsc::Receiver<BridgeCommand>) {
        router_with_capacity(16)
    }

    fn router_with_capacity(capacity: usize) -> (Router, SharedStateHandle, mpsc::Receiver<BridgeCommand>) {
        let (tx, rx) = mpsc::channel(capacity);
        let state = Arc::new(SharedState::new(tx));
        (create_router(state.clone()), state, rx)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_status() {
        let (app, _state, _rx) = router();
        let response = app
            .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_input_is_queued() {
        let (app, _state, mut rx) = router();
        let scene = json!({ "name": "s1", "windows": [{ "activity": "pano" }] });
        let response = app
            .oneshot(post_json("/api/input/scene", &scene.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(body_json(response).await["channel"], "scene");

        match rx.try_recv().unwrap() {
            BridgeCommand::Input { channel, message } => {
                assert_eq!(channel, "scene");
                assert_eq!(message, scene);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_object_input_is_rejected() {
        let (app, _state, mut rx) = router();
        let response = app.oneshot(post_json("/api/input/scene", "[1, 2]")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_queue_is_unavailable() {
        let (app, _state, rx) = router();
        drop(rx);
        let response = app.oneshot(post_json("/api/groups/refresh", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["code"], 503);
    }

    #[tokio::test]
    async fn test_full_queue_is_unavailable() {
        let (app, _state, mut rx) = router_with_capacity(1);
        let scene = json!({ "name": "s1", "windows": [] }).to_string();

        let response = app.clone().oneshot(post_json("/api/input/scene", &scene)).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let response = app.clone().oneshot(post_json("/api/input/scene", &scene)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_json(response).await["message"], "Scene bridge is busy");

        // Room again once the bridge takes one
        assert!(rx.try_recv().is_ok());
        let response = app.oneshot(post_json("/api/input/scene", &scene)).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_refresh_groups_is_queued() {
        let (app, _state, mut rx) = router();
        let response = app
            .oneshot(Request::post("/api/groups/refresh").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(matches!(rx.try_recv().unwrap(), BridgeCommand::RefreshGroups));
    }

    #[tokio::test]
    async fn test_last_scene_not_found_until_handled() {
        let (app, state, _rx) = router();
        let response = app
            .clone()
            .oneshot(Request::get("/api/scene").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        state.update_snapshot(|snap| {
            snap.last_scene = Some(SceneOutcome {
                scene: "s2".to_string(),
                app: crate::scene::SceneApp::Earth,
                groups: Vec::new(),
            });
        });
        let response = app
            .oneshot(Request::get("/api/scene").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["scene"], "s2");
        assert_eq!(json["app"], "earth");
    }
}
