//! Authenticated-session extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use http::StatusCode;
use http::request::Parts;
use portal_core::error::ErrorEnvelope;
use uuid::Uuid;

use crate::cookie::PORTAL_ACCESS_TOKEN;
use crate::token::validate_access_token;

/// HMAC secret used to validate session tokens.
///
/// Router state exposes it through `FromRef` so [`SessionIdentity`] can be
/// extracted without knowing the concrete state type.
#[derive(Clone)]
pub struct JwtSecret(pub String);

/// Rejection for a missing or unusable access-token cookie.
///
/// Renders as `401 {"success":false,"kind":"INVALID_TOKEN","message":"Invalid session"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRejection;

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        ErrorEnvelope::new("INVALID_TOKEN", "Invalid session")
            .into_response_with(StatusCode::UNAUTHORIZED)
    }
}

/// Identity of the caller, taken from a valid access-token cookie.
///
/// Rejected with [`SessionRejection`] if the cookie is absent, expired or
/// fails validation.
#[derive(Debug, Clone)]
pub struct SessionIdentity {
    pub user_id: Uuid,
    pub user_role: u8,
    pub access_token_exp: u64,
}

impl<S> FromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
    JwtSecret: FromRef<S>,
{
    type Rejection = SessionRejection;

    // Values are read synchronously so the returned future owns everything it needs.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let JwtSecret(secret) = JwtSecret::from_ref(state);
        let token = CookieJar::from_headers(&parts.headers)
            .get(PORTAL_ACCESS_TOKEN)
            .map(|c| c.value().to_owned());

        async move {
            let token = token.ok_or(SessionRejection)?;
            let info = validate_access_token(&token, &secret).map_err(|e| {
                tracing::debug!(error = %e, "rejected session cookie");
                SessionRejection
            })?;
            Ok(Self {
                user_id: info.user_id,
                user_role: info.user_role,
                access_token_exp: info.access_token_exp,
            })
        }
    }
}
