#![allow(async_fn_in_trait)]

use portal_domain::channel::{Channel, Destination};
use portal_domain::verification::VerificationPurpose;

/// Failure to hand a code to a delivery provider.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Provider credentials or sender identity are missing from configuration.
    #[error("{0} channel not configured")]
    NotConfigured(Channel),
    /// Transport failure or non-2xx provider response.
    #[error("provider rejected message: {0}")]
    Provider(String),
}

/// Rendered email ready for a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Rendered text message ready for a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    pub to: String,
    pub body: String,
}

/// Email provider seam.
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError>;
}

/// SMS provider seam.
pub trait SmsSender: Send + Sync {
    async fn send(&self, message: &SmsMessage) -> Result<(), DeliveryError>;
}

/// Delivers a one-time code to a destination, whichever channel it names.
pub trait CodeSender: Send + Sync {
    async fn send_code(
        &self,
        destination: &Destination,
        purpose: VerificationPurpose,
        code: &str,
    ) -> Result<(), DeliveryError>;
}
