use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use portal_domain::channel::{Channel, Destination};

use super::JsonBody;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::two_factor::{
    SendTwoFactorCodeInput, SendTwoFactorCodeUseCase, VerifyTwoFactorCodeInput,
    VerifyTwoFactorCodeOutput, VerifyTwoFactorCodeUseCase,
};

#[derive(Serialize)]
pub struct CodeSentResponse {
    pub success: bool,
    pub message: &'static str,
    /// Masked address or phone number.
    pub destination: String,
}

#[derive(Serialize)]
pub struct VerifiedData {
    pub email: String,
    pub password: String,
    pub clearance: String,
}

#[derive(Serialize)]
pub struct CodeVerifiedResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: VerifiedData,
}

impl From<VerifyTwoFactorCodeOutput> for CodeVerifiedResponse {
    fn from(out: VerifyTwoFactorCodeOutput) -> Self {
        Self {
            success: true,
            message: "Code verified",
            data: VerifiedData {
                email: out.email,
                password: out.password,
                clearance: out.clearance,
            },
        }
    }
}

fn code_sent(destination: Destination) -> Json<CodeSentResponse> {
    Json(CodeSentResponse {
        success: true,
        message: "Verification code sent",
        destination: destination.masked(),
    })
}

async fn send_code(
    state: AppState,
    channel: Channel,
    email: String,
    password: String,
    phone: Option<String>,
) -> Result<Json<CodeSentResponse>, AuthServiceError> {
    let usecase = SendTwoFactorCodeUseCase {
        users: state.user_repo(),
        dispatch: state.dispatch(),
    };
    let destination = usecase
        .execute(SendTwoFactorCodeInput {
            email,
            password,
            channel,
            phone,
        })
        .await?;
    Ok(code_sent(destination))
}

async fn verify_code(
    state: AppState,
    channel: Channel,
    body: VerifyCodeRequest,
) -> Result<Json<CodeVerifiedResponse>, AuthServiceError> {
    let usecase = VerifyTwoFactorCodeUseCase {
        users: state.user_repo(),
        verify: state.verify(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(VerifyTwoFactorCodeInput {
            email: body.email,
            code: body.code,
            channel,
        })
        .await?;
    Ok(Json(out.into()))
}

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

// ── POST /api/auth/send-2fa-code ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendEmailCodeRequest {
    pub email: String,
    pub password: String,
}

pub async fn send_2fa_code(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SendEmailCodeRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    send_code(state, Channel::Email, body.email, body.password, None).await
}

// ── POST /api/auth/verify-2fa-code ───────────────────────────────────────────

pub async fn verify_2fa_code(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<VerifyCodeRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    verify_code(state, Channel::Email, body).await
}

// ── POST /api/auth/sms/send-code ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendSmsCodeRequest {
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

pub async fn send_sms_code(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SendSmsCodeRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    send_code(state, Channel::Sms, body.email, body.password, body.phone).await
}

// ── PUT /api/auth/sms/verify-code ────────────────────────────────────────────

pub async fn verify_sms_code(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<VerifyCodeRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    verify_code(state, Channel::Sms, body).await
}
