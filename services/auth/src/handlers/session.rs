use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use portal_auth_types::{
    cookie::{PORTAL_REFRESH_TOKEN, clear_cookies, set_access_token_cookie, set_refresh_token_cookie},
    session::SessionIdentity,
};

use super::{JsonBody, token_expires_header};
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::session::{
    RefreshSessionUseCase, SessionTokens, SignInInput, SignInOutput, SignInUseCase,
};

fn set_session(state: &AppState, jar: CookieJar, tokens: SessionTokens) -> (CookieJar, HeaderMap) {
    let jar = set_access_token_cookie(jar, tokens.access_token, &state.cookies);
    let jar = set_refresh_token_cookie(jar, tokens.refresh_token, &state.cookies);

    let mut headers = HeaderMap::new();
    let (name, value) = token_expires_header(tokens.access_token_exp);
    headers.insert(name, value);
    (jar, headers)
}

// ── POST /api/auth/sign-in ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    /// Clearance token from a successful two-factor verification.
    pub clearance: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub success: bool,
    pub two_factor_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_on_file: Option<bool>,
}

pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(body): JsonBody<SignInRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SignInUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };

    let out = usecase
        .execute(SignInInput {
            email: body.email,
            password: body.password,
            clearance: body.clearance,
        })
        .await?;

    match out {
        SignInOutput::TwoFactorRequired { phone_on_file } => Ok((
            jar,
            HeaderMap::new(),
            Json(SignInResponse {
                success: true,
                two_factor_required: true,
                phone_on_file: Some(phone_on_file),
            }),
        )),
        SignInOutput::SignedIn(tokens) => {
            let (jar, headers) = set_session(&state, jar, tokens);
            Ok((
                jar,
                headers,
                Json(SignInResponse {
                    success: true,
                    two_factor_required: false,
                    phone_on_file: None,
                }),
            ))
        }
    }
}

// ── GET /api/auth/session ────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    pub user_id: uuid::Uuid,
    pub user_role: u8,
    pub access_token_exp: u64,
}

pub async fn check_session(identity: SessionIdentity) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    let (name, value) = token_expires_header(identity.access_token_exp);
    headers.insert(name, value);

    (
        headers,
        Json(SessionResponse {
            success: true,
            user_id: identity.user_id,
            user_role: identity.user_role,
            access_token_exp: identity.access_token_exp,
        }),
    )
}

// ── PATCH /api/auth/session ──────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub access_token_exp: u64,
}

pub async fn refresh_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    let refresh_value = jar
        .get(PORTAL_REFRESH_TOKEN)
        .map(|c| c.value().to_owned())
        .ok_or(AuthServiceError::InvalidRefreshToken)?;

    let usecase = RefreshSessionUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let tokens = usecase.execute(&refresh_value).await?;
    let access_token_exp = tokens.access_token_exp;
    let (jar, headers) = set_session(&state, jar, tokens);

    Ok((
        jar,
        headers,
        Json(RefreshResponse {
            success: true,
            access_token_exp,
        }),
    ))
}

// ── DELETE /api/auth/session ─────────────────────────────────────────────────

pub async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, clear_cookies(jar, &state.cookies))
}
