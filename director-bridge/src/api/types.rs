//! API request/response types
//!
//! These types are used for JSON serialization in API endpoints.

use serde::{Deserialize, Serialize};

/// Server status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Response for queued commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// Bus message sent over the WebSocket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub channel: String,
    pub message: serde_json::Value,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub code: u16,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: "Not Found".to_string(),
            message: message.into(),
            code: 404,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            error: "Bad Request".to_string(),
            message: message.into(),
            code: 400,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            error: "Service Unavailable".to_string(),
            message: message.into(),
            code: 503,
        }
    }
}
