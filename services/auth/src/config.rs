use serde::Deserialize;

use portal_core::config::Config;

/// Auth service configuration loaded from environment variables.
///
/// Not `Debug`: holds provider credentials.
#[derive(Deserialize)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for session and clearance tokens.
    pub jwt_secret: String,
    /// Cookie domain attribute; host-only cookies when unset.
    pub cookie_domain: Option<String>,
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// TCP port to listen on. Env var: `AUTH_PORT`.
    #[serde(default = "default_port")]
    pub auth_port: u16,
    /// Product name used in message templates.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Apply pending migrations at startup.
    #[serde(default = "default_true")]
    pub run_migrations: bool,

    /// Sender address for outgoing email.
    pub mail_from: Option<String>,
    pub sendgrid_api_key: Option<String>,
    #[serde(default = "default_sendgrid_base_url")]
    pub sendgrid_base_url: String,

    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,
    #[serde(default = "default_twilio_base_url")]
    pub twilio_base_url: String,

    /// Log codes instead of calling providers. Development only.
    #[serde(default)]
    pub console_delivery: bool,
}

impl Config for AuthConfig {}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    3112
}

fn default_app_name() -> String {
    "Portal".to_owned()
}

fn default_sendgrid_base_url() -> String {
    "https://api.sendgrid.com".to_owned()
}

fn default_twilio_base_url() -> String {
    "https://api.twilio.com".to_owned()
}
