#![allow(async_fn_in_trait)]

use serde::Deserialize;
use uuid::Uuid;

use portal_domain::channel::Channel;

/// Failure talking to the auth service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The service answered with a non-2xx status.
    #[error("request rejected with status {status}")]
    Rejected {
        status: u16,
        kind: Option<String>,
        message: Option<String>,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// User-facing message supplied by the service, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Result of submitting credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    TwoFactorRequired { phone_on_file: bool },
    SignedIn,
}

/// Data released by a successful code verification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifiedPayload {
    pub email: String,
    pub password: String,
    /// Proof of the passed second factor, presented when finalizing.
    #[serde(default)]
    pub clearance: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub user_role: u8,
    pub access_token_exp: u64,
}

/// Auth endpoints the sign-in flow depends on.
pub trait AuthApi {
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
        clearance: Option<&str>,
    ) -> Result<SignInOutcome, ApiError>;

    /// `phone` is only meaningful for [`Channel::Sms`]; `None` means the number on file.
    async fn send_code(
        &self,
        channel: Channel,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<(), ApiError>;

    async fn verify_code(
        &self,
        channel: Channel,
        email: &str,
        code: &str,
    ) -> Result<VerifiedPayload, ApiError>;

    async fn fetch_session(&self) -> Result<SessionInfo, ApiError>;
}
