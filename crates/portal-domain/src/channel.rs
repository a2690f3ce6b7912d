//! Delivery channels and their destinations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::verification::VerificationPurpose;

/// Medium a one-time code travels through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    /// Purpose under which a 2FA code for this channel is stored.
    pub fn two_factor_purpose(self) -> VerificationPurpose {
        match self {
            Self::Email => VerificationPurpose::EmailTwoFactor,
            Self::Sms => VerificationPurpose::SmsTwoFactor,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Sms => f.write_str("sms"),
        }
    }
}

/// Where a code is sent.
///
/// Wire format: `{"kind":"email","address":"..."}` or `{"kind":"sms","phone":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    Email { address: String },
    Sms { phone: String },
}

impl Destination {
    pub fn email(address: impl Into<String>) -> Self {
        Self::Email {
            address: address.into(),
        }
    }

    pub fn sms(phone: impl Into<String>) -> Self {
        Self::Sms {
            phone: phone.into(),
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            Self::Email { .. } => Channel::Email,
            Self::Sms { .. } => Channel::Sms,
        }
    }

    /// Raw address or phone number.
    pub fn target(&self) -> &str {
        match self {
            Self::Email { address } => address,
            Self::Sms { phone } => phone,
        }
    }

    /// Partially hidden form safe for logs and user-facing messages.
    pub fn masked(&self) -> String {
        match self {
            Self::Email { address } => match address.split_once('@') {
                Some((local, domain)) => {
                    let first: String = local.chars().take(1).collect();
                    format!("{first}***@{domain}")
                }
                None => "***".to_owned(),
            },
            Self::Sms { phone } => {
                let digits: Vec<char> = phone.chars().collect();
                let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
                format!("***{tail}")
            }
        }
    }
}
