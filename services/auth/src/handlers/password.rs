use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use portal_auth_types::session::SessionIdentity;
use portal_domain::id::UserId;

use super::{JsonBody, ok_message};
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::password::{
    ChangePasswordInput, ChangePasswordUseCase, RequestPasswordResetUseCase, ResetPasswordInput,
    ResetPasswordUseCase,
};

/// Same reply whether or not the email has an account.
pub const RESET_REQUESTED: &str = "If an account exists for that email, a reset code has been sent";

// ── POST /api/auth/password-reset ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestResetRequest {
    pub email: String,
}

pub async fn request_password_reset(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RequestResetRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = RequestPasswordResetUseCase {
        users: state.user_repo(),
        dispatch: state.dispatch(),
    };
    usecase.execute(&body.email).await?;
    Ok((StatusCode::ACCEPTED, ok_message(RESET_REQUESTED)))
}

// ── PUT /api/auth/password-reset ─────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
        verify: state.verify(),
    };
    usecase
        .execute(ResetPasswordInput {
            email: body.email,
            code: body.code,
            new_password: body.new_password,
        })
        .await?;
    Ok(ok_message("Password updated"))
}

// ── PUT /api/account/password ────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    identity: SessionIdentity,
    JsonBody(body): JsonBody<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(ChangePasswordInput {
            user_id: UserId(identity.user_id),
            current_password: body.current_password,
            new_password: body.new_password,
        })
        .await?;
    Ok(ok_message("Password updated"))
}
