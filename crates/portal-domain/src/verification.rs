//! Verification purposes and one-time code format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of digits in every one-time code.
pub const CODE_LEN: usize = 6;

/// Lifetime of a dispatched code in seconds (10 minutes).
pub const CODE_TTL_SECS: i64 = 600;

/// Failed attempts after which a record is discarded.
pub const MAX_VERIFY_ATTEMPTS: i32 = 5;

/// Discriminates concurrent verification flows for the same user.
///
/// At most one record exists per `(user, purpose)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPurpose {
    #[serde(rename = "email_2fa")]
    EmailTwoFactor,
    #[serde(rename = "sms_2fa")]
    SmsTwoFactor,
    PasswordReset,
    EmailVerification,
}

impl VerificationPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailTwoFactor => "email_2fa",
            Self::SmsTwoFactor => "sms_2fa",
            Self::PasswordReset => "password_reset",
            Self::EmailVerification => "email_verification",
        }
    }

    /// Whether a successful verification clears the second sign-in factor.
    pub fn is_two_factor(self) -> bool {
        matches!(self, Self::EmailTwoFactor | Self::SmsTwoFactor)
    }
}

impl fmt::Display for VerificationPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown verification purpose: {0}")]
pub struct UnknownPurpose(pub String);

impl FromStr for VerificationPurpose {
    type Err = UnknownPurpose;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_2fa" => Ok(Self::EmailTwoFactor),
            "sms_2fa" => Ok(Self::SmsTwoFactor),
            "password_reset" => Ok(Self::PasswordReset),
            "email_verification" => Ok(Self::EmailVerification),
            other => Err(UnknownPurpose(other.to_owned())),
        }
    }
}

/// `true` when `code`, after trimming, is exactly [`CODE_LEN`] ASCII digits.
pub fn is_well_formed_code(code: &str) -> bool {
    let code = code.trim();
    code.len() == CODE_LEN && code.bytes().all(|b| b.is_ascii_digit())
}
