use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use portal_auth_types::session::SessionIdentity;
use portal_core::serde::to_rfc3339_ms;
use portal_domain::id::UserId;

use super::{JsonBody, ok_message};
use crate::domain::types::AuthUser;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::account::{
    GetAccountUseCase, SetTwoFactorUseCase, SignUpInput, SignUpUseCase, UpdateAccountInput,
    UpdateAccountUseCase, VerifyEmailUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBody {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub two_factor_enabled: bool,
    pub email_verified: bool,
    pub role: u8,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<AuthUser> for AccountBody {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id.0,
            name: user.name,
            email: user.email,
            phone: user.phone,
            two_factor_enabled: user.two_factor_enabled,
            email_verified: user.email_verified,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: AccountBody,
}

fn account(user: AuthUser, message: Option<&'static str>) -> Json<AccountResponse> {
    Json(AccountResponse {
        success: true,
        message,
        data: user.into(),
    })
}

// ── POST /api/auth/sign-up ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

pub async fn sign_up(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignUpRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SignUpUseCase {
        users: state.user_repo(),
        dispatch: state.dispatch(),
    };
    let user = usecase
        .execute(SignUpInput {
            name: body.name,
            email: body.email,
            password: body.password,
            phone: body.phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        account(
            user,
            Some("Account created. Check your email for a verification code."),
        ),
    ))
}

// ── POST /api/auth/email-verification ────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

pub async fn verify_email(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<VerifyEmailRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = VerifyEmailUseCase {
        users: state.user_repo(),
        verify: state.verify(),
    };
    usecase.execute(&body.email, &body.code).await?;
    Ok(ok_message("Email verified"))
}

// ── GET /api/account ─────────────────────────────────────────────────────────

pub async fn get_account(
    State(state): State<AppState>,
    identity: SessionIdentity,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = GetAccountUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(UserId(identity.user_id)).await?;
    Ok(account(user, None))
}

// ── PATCH /api/account ───────────────────────────────────────────────────────

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
}

pub async fn update_account(
    State(state): State<AppState>,
    identity: SessionIdentity,
    JsonBody(body): JsonBody<UpdateAccountRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = UpdateAccountUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(UpdateAccountInput {
            user_id: UserId(identity.user_id),
            name: body.name,
            phone: body.phone,
        })
        .await?;
    Ok(account(user, Some("Profile updated")))
}

// ── PATCH /api/account/two-factor ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetTwoFactorRequest {
    pub enabled: bool,
}

pub async fn set_two_factor(
    State(state): State<AppState>,
    identity: SessionIdentity,
    JsonBody(body): JsonBody<SetTwoFactorRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SetTwoFactorUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(UserId(identity.user_id), body.enabled)
        .await?;
    let message = if body.enabled {
        "Two-factor authentication enabled"
    } else {
        "Two-factor authentication disabled"
    };
    Ok(account(user, Some(message)))
}
