//! Shared response envelope types for API handlers.
//!
//! Every successful response uses a `{ "success": true, "message"?, "data"? }`
//! envelope; error responses carry `{ "success": false, "error" }` and are
//! built by the [`crate::error`] module. Use [`ApiResponse`] instead of ad-hoc
//! `serde_json::json!` blocks to get compile-time type safety and consistent
//! serialization.

use serde::Serialize;

/// Standard `{ "success": true, ... }` response envelope.
///
/// `message` and `data` are omitted from the JSON when absent, so a plain
/// acknowledgement serializes as `{"success":true,"message":"..."}` and a
/// data response as `{"success":true,"data":...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Envelope carrying only a payload.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Envelope carrying a payload plus a user-facing message.
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope carrying only a user-facing message (deletes, logout).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}
