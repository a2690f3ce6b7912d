use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Fallback detail used when an internal error renders to an empty string.
pub const GENERIC_ERROR_DETAIL: &str = "An unexpected error occurred";

/// JSON body returned by every failing endpoint.
///
/// ```json
/// { "success": false, "kind": "INVALID_CODE", "message": "Invalid or expired code" }
/// ```
///
/// `error` carries a human-readable detail for server-side failures only.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            kind,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, detail: impl Into<String>) -> Self {
        self.error = Some(detail.into());
        self
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, axum::Json(self)).into_response()
    }
}

/// Best-effort human-readable description of an internal error.
///
/// Walks the `anyhow` chain and joins each cause; an error with no text at
/// all falls back to [`GENERIC_ERROR_DETAIL`].
pub fn describe_error(error: &anyhow::Error) -> String {
    let detail = error
        .chain()
        .map(|cause| cause.to_string())
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(": ");
    if detail.is_empty() {
        GENERIC_ERROR_DETAIL.to_owned()
    } else {
        detail
    }
}
