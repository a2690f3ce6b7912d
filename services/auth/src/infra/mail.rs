//! Email delivery providers.

use reqwest::Client;
use serde::Serialize;

use portal_domain::channel::Channel;

use crate::config::AuthConfig;
use crate::domain::delivery::{DeliveryError, EmailMessage, EmailSender};

// ── SendGrid ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SendGridMailer {
    client: Client,
    base_url: String,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendMailRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 2],
}

impl SendGridMailer {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }
}

impl EmailSender for SendGridMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        let body = SendMailRequest {
            personalizations: [Personalization {
                to: [Address { email: &message.to }],
            }],
            from: Address { email: &self.from },
            subject: &message.subject,
            content: [
                Content {
                    kind: "text/plain",
                    value: &message.text,
                },
                Content {
                    kind: "text/html",
                    value: &message.html,
                },
            ],
        };

        let resp = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Provider(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, %detail, "sendgrid rejected message");
            return Err(DeliveryError::Provider(format!("status {}", status.as_u16())));
        }
        Ok(())
    }
}

// ── Console ──────────────────────────────────────────────────────────────────

/// Writes messages to the log instead of sending them.
#[derive(Clone, Default)]
pub struct ConsoleMailer;

impl EmailSender for ConsoleMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.text,
            "console email"
        );
        Ok(())
    }
}

// ── Selection ────────────────────────────────────────────────────────────────

/// Email provider chosen at startup.
#[derive(Clone)]
pub enum EmailProvider {
    SendGrid(SendGridMailer),
    Console(ConsoleMailer),
    Unconfigured,
}

impl EmailProvider {
    pub fn from_config(config: &AuthConfig, client: Client) -> Self {
        if config.console_delivery {
            return Self::Console(ConsoleMailer);
        }
        match (&config.sendgrid_api_key, &config.mail_from) {
            (Some(key), Some(from)) => Self::SendGrid(SendGridMailer::new(
                client,
                config.sendgrid_base_url.clone(),
                key.clone(),
                from.clone(),
            )),
            _ => Self::Unconfigured,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SendGrid(_) => "sendgrid",
            Self::Console(_) => "console",
            Self::Unconfigured => "unconfigured",
        }
    }
}

impl EmailSender for EmailProvider {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        match self {
            Self::SendGrid(p) => p.send(message).await,
            Self::Console(p) => p.send(message).await,
            Self::Unconfigured => Err(DeliveryError::NotConfigured(Channel::Email)),
        }
    }
}
