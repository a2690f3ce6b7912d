use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portal_auth_types::cookie::{ACCESS_TOKEN_EXP, REFRESH_TOKEN_EXP};
use portal_auth_types::token::{JwtClaims, TokenKind, validate_refresh_token};
use portal_domain::id::UserId;

use crate::domain::repository::UserRepository;
use crate::domain::types::{AuthUser, CLEARANCE_TTL_SECS};
use crate::error::AuthServiceError;
use crate::usecase::password::check_credentials;

/// `purpose` claim carried by two-factor clearance tokens.
pub const CLEARANCE_PURPOSE: &str = "2fa_clearance";

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, AuthServiceError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(e.into()))
}

pub fn issue_access_token(
    user: &AuthUser,
    secret: &str,
) -> Result<(String, u64), AuthServiceError> {
    let exp = now_secs() + ACCESS_TOKEN_EXP;
    let claims = JwtClaims {
        sub: user.id.to_string(),
        role: user.role,
        kind: TokenKind::Access,
        exp,
    };
    Ok((sign(&claims, secret)?, exp))
}

pub fn issue_refresh_token(user: &AuthUser, secret: &str) -> Result<String, AuthServiceError> {
    let claims = JwtClaims {
        sub: user.id.to_string(),
        role: user.role,
        kind: TokenKind::Refresh,
        exp: now_secs() + REFRESH_TOKEN_EXP,
    };
    sign(&claims, secret)
}

// ── Two-factor clearance ─────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct ClearanceClaims {
    sub: String,
    purpose: String,
    exp: u64,
}

/// Short-lived proof that `user_id` just passed a two-factor check.
pub fn issue_clearance_token(user_id: UserId, secret: &str) -> Result<String, AuthServiceError> {
    let claims = ClearanceClaims {
        sub: user_id.to_string(),
        purpose: CLEARANCE_PURPOSE.to_owned(),
        exp: now_secs() + CLEARANCE_TTL_SECS,
    };
    sign(&claims, secret)
}

/// True when `token` is an unexpired clearance for exactly `user_id`.
pub fn is_valid_clearance(token: &str, user_id: UserId, secret: &str) -> bool {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.leeway = 0;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    match decode::<ClearanceClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => {
            data.claims.purpose == CLEARANCE_PURPOSE && data.claims.sub == user_id.to_string()
        }
        Err(e) => {
            tracing::debug!(error = %e, "rejected clearance token");
            false
        }
    }
}

// ── SignIn ───────────────────────────────────────────────────────────────────

pub struct SignInInput {
    pub email: String,
    pub password: String,
    pub clearance: Option<String>,
}

#[derive(Debug)]
pub struct SessionTokens {
    pub user: AuthUser,
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
}

#[derive(Debug)]
pub enum SignInOutput {
    /// Credentials are valid but a second factor is still needed.
    TwoFactorRequired { phone_on_file: bool },
    SignedIn(SessionTokens),
}

pub struct SignInUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> SignInUseCase<U> {
    pub async fn execute(&self, input: SignInInput) -> Result<SignInOutput, AuthServiceError> {
        let user = check_credentials(&self.users, &input.email, &input.password).await?;

        if user.two_factor_enabled {
            let cleared = input
                .clearance
                .as_deref()
                .is_some_and(|t| is_valid_clearance(t, user.id, &self.jwt_secret));
            if !cleared {
                return Ok(SignInOutput::TwoFactorRequired {
                    phone_on_file: user.phone.is_some(),
                });
            }
        }

        let (access_token, access_token_exp) = issue_access_token(&user, &self.jwt_secret)?;
        let refresh_token = issue_refresh_token(&user, &self.jwt_secret)?;
        tracing::info!(user_id = %user.id, "signed in");

        Ok(SignInOutput::SignedIn(SessionTokens {
            user,
            access_token,
            access_token_exp,
            refresh_token,
        }))
    }
}

// ── RefreshSession ───────────────────────────────────────────────────────────

pub struct RefreshSessionUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> RefreshSessionUseCase<U> {
    pub async fn execute(
        &self,
        refresh_token_value: &str,
    ) -> Result<SessionTokens, AuthServiceError> {
        let claims = validate_refresh_token(refresh_token_value, &self.jwt_secret)
            .map_err(|_| AuthServiceError::InvalidRefreshToken)?;

        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthServiceError::InvalidRefreshToken)?;

        // Role and account existence are re-read so rotation reflects current data.
        let user = self
            .users
            .find_by_id(UserId(user_id))
            .await?
            .ok_or(AuthServiceError::InvalidRefreshToken)?;

        let (access_token, access_token_exp) = issue_access_token(&user, &self.jwt_secret)?;
        let refresh_token = issue_refresh_token(&user, &self.jwt_secret)?;

        Ok(SessionTokens {
            user,
            access_token,
            access_token_exp,
            refresh_token,
        })
    }
}
