use axum::Json;
use axum::extract::FromRequest;
use axum::http::{HeaderName, HeaderValue};
use serde::Serialize;

use crate::error::AuthServiceError;

pub mod account;
pub mod password;
pub mod session;
pub mod two_factor;

/// JSON request body; a missing field or bad syntax answers with the
/// `INVALID_INPUT` envelope rather than axum's plain-text rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AuthServiceError))]
pub struct JsonBody<T>(pub T);

const X_PORTAL_ACCESS_TOKEN_EXPIRES: &str = "x-portal-access-token-expires";

fn token_expires_header(exp: u64) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(X_PORTAL_ACCESS_TOKEN_EXPIRES),
        HeaderValue::from(exp),
    )
}

/// `{ "success": true, "message": ... }`
#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

fn ok_message(message: &'static str) -> Json<MessageResponse> {
    Json(MessageResponse {
        success: true,
        message,
    })
}
