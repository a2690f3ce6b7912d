//! SMS delivery providers.

use reqwest::Client;
use serde::Deserialize;

use portal_domain::channel::Channel;

use crate::config::AuthConfig;
use crate::domain::delivery::{DeliveryError, SmsMessage, SmsSender};

// ── Twilio ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TwilioSms {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from: String,
}

#[derive(Deserialize)]
struct MessageResource {
    sid: String,
}

impl TwilioSms {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from: from.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

impl SmsSender for TwilioSms {
    async fn send(&self, message: &SmsMessage) -> Result<(), DeliveryError> {
        let form = [
            ("To", message.to.as_str()),
            ("From", self.from.as_str()),
            ("Body", message.body.as_str()),
        ];
        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| DeliveryError::Provider(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, %detail, "twilio rejected message");
            return Err(DeliveryError::Provider(format!("status {}", status.as_u16())));
        }

        let resource: MessageResource = resp
            .json()
            .await
            .map_err(|e| DeliveryError::Provider(format!("unexpected response: {e}")))?;
        tracing::debug!(sid = %resource.sid, "twilio accepted message");
        Ok(())
    }
}

// ── Console ──────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ConsoleSms;

impl SmsSender for ConsoleSms {
    async fn send(&self, message: &SmsMessage) -> Result<(), DeliveryError> {
        tracing::info!(to = %message.to, body = %message.body, "console sms");
        Ok(())
    }
}

// ── Selection ────────────────────────────────────────────────────────────────

/// SMS provider chosen at startup.
#[derive(Clone)]
pub enum SmsProvider {
    Twilio(TwilioSms),
    Console(ConsoleSms),
    Unconfigured,
}

impl SmsProvider {
    pub fn from_config(config: &AuthConfig, client: Client) -> Self {
        if config.console_delivery {
            return Self::Console(ConsoleSms);
        }
        match (
            &config.twilio_account_sid,
            &config.twilio_auth_token,
            &config.twilio_from_number,
        ) {
            (Some(sid), Some(token), Some(from)) => Self::Twilio(TwilioSms::new(
                client,
                config.twilio_base_url.clone(),
                sid.clone(),
                token.clone(),
                from.clone(),
            )),
            _ => Self::Unconfigured,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Twilio(_) => "twilio",
            Self::Console(_) => "console",
            Self::Unconfigured => "unconfigured",
        }
    }
}

impl SmsSender for SmsProvider {
    async fn send(&self, message: &SmsMessage) -> Result<(), DeliveryError> {
        match self {
            Self::Twilio(p) => p.send(message).await,
            Self::Console(p) => p.send(message).await,
            Self::Unconfigured => Err(DeliveryError::NotConfigured(Channel::Sms)),
        }
    }
}
