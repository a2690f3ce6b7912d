use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use portal_core::error::{ErrorEnvelope, describe_error};

use crate::domain::delivery::DeliveryError;

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid or expired code")]
    InvalidCode,
    #[error("Code has expired. Please request a new one.")]
    CodeExpired,
    #[error("Phone number required")]
    PhoneRequired,
    #[error("Email already registered")]
    EmailTaken,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid session")]
    InvalidToken,
    #[error("Invalid refresh token")]
    InvalidRefreshToken,
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidCode => "INVALID_CODE",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::PhoneRequired => "PHONE_REQUIRED",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::Delivery(DeliveryError::NotConfigured(_)) => "CHANNEL_NOT_CONFIGURED",
            Self::Delivery(_) => "DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::InvalidCode | Self::CodeExpired | Self::PhoneRequired => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCredentials | Self::InvalidToken | Self::InvalidRefreshToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::Delivery(DeliveryError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Delivery(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<JsonRejection> for AuthServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = match &self {
            // TraceLayer already records every request; only 500s are logged here.
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
                ErrorEnvelope::new(self.kind(), self.to_string()).with_error(describe_error(e))
            }
            Self::Delivery(e) => {
                let message = match e {
                    DeliveryError::NotConfigured(_) => "Channel not configured",
                    DeliveryError::Provider(_) => "Failed to send code",
                };
                ErrorEnvelope::new(self.kind(), message).with_error(e.to_string())
            }
            _ => ErrorEnvelope::new(self.kind(), self.to_string()),
        };
        envelope.into_response_with(status)
    }
}
