//! Signed session cookies for tests.
//!
//! Mirrors what the auth service issues so extractors and clients can be
//! exercised without a sign-in round trip.

use std::time::{SystemTime, UNIX_EPOCH};

use http::HeaderValue;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use portal_auth_types::cookie::{
    ACCESS_TOKEN_EXP, PORTAL_ACCESS_TOKEN, PORTAL_REFRESH_TOKEN, REFRESH_TOKEN_EXP,
};
use portal_auth_types::token::{JwtClaims, TokenKind};

/// Identity to sign tokens for.
pub struct TestSession {
    pub user_id: Uuid,
    pub user_role: u8,
    pub secret: String,
}

impl TestSession {
    pub fn new(user_id: Uuid, user_role: u8, secret: impl Into<String>) -> Self {
        Self {
            user_id,
            user_role,
            secret: secret.into(),
        }
    }

    fn sign(&self, kind: TokenKind, exp: u64) -> String {
        let claims = JwtClaims {
            sub: self.user_id.to_string(),
            role: self.user_role,
            kind,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    pub fn access_token(&self) -> String {
        self.sign(TokenKind::Access, Self::now() + ACCESS_TOKEN_EXP)
    }

    pub fn refresh_token(&self) -> String {
        self.sign(TokenKind::Refresh, Self::now() + REFRESH_TOKEN_EXP)
    }

    /// Access token that expired well past the validation leeway.
    pub fn expired_access_token(&self) -> String {
        self.sign(TokenKind::Access, Self::now() - 3600)
    }

    /// `Cookie` header carrying a valid access token.
    pub fn access_cookie(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("{PORTAL_ACCESS_TOKEN}={}", self.access_token())).unwrap()
    }

    /// `Cookie` header carrying a valid refresh token.
    pub fn refresh_cookie(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("{PORTAL_REFRESH_TOKEN}={}", self.refresh_token())).unwrap()
    }
}
