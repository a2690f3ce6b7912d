use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::{Value, json};

use portal_auth::config::AuthConfig;
use portal_auth::domain::delivery::{
    CodeSender, DeliveryError, EmailMessage, EmailSender, SmsMessage, SmsSender,
};
use portal_auth::infra::delivery::ChannelRouter;
use portal_auth::infra::mail::{EmailProvider, SendGridMailer};
use portal_auth::infra::sms::{SmsProvider, TwilioSms};
use portal_core::config::Config;
use portal_domain::channel::{Channel, Destination};
use portal_domain::verification::VerificationPurpose;
use portal_testing::server::StubServer;

#[derive(Debug, Clone)]
struct Captured {
    authorization: Option<String>,
    body: Value,
}

type Inbox = Arc<Mutex<Vec<Captured>>>;

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn sample_email() -> EmailMessage {
    EmailMessage {
        to: "jane@example.com".to_owned(),
        subject: "Your Portal sign-in verification code".to_owned(),
        html: "<p>482913</p>".to_owned(),
        text: "Your code is 482913".to_owned(),
    }
}

fn sample_sms() -> SmsMessage {
    SmsMessage {
        to: "+15551234567".to_owned(),
        body: "Portal: your sign-in verification code is 482913.".to_owned(),
    }
}

// ── SendGrid ─────────────────────────────────────────────────────────────────

async fn sendgrid_stub(status: StatusCode) -> (StubServer, Inbox) {
    let inbox = Inbox::default();
    let router = Router::new()
        .route(
            "/v3/mail/send",
            post(
                move |State(inbox): State<Inbox>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    inbox.lock().unwrap().push(Captured {
                        authorization: authorization(&headers),
                        body,
                    });
                    status
                },
            ),
        )
        .with_state(inbox.clone());
    (StubServer::spawn(router).await, inbox)
}

#[tokio::test]
async fn should_post_email_to_sendgrid_with_bearer_key() {
    let (server, inbox) = sendgrid_stub(StatusCode::ACCEPTED).await;
    let mailer = SendGridMailer::new(
        reqwest::Client::new(),
        server.base_url(),
        "SG.test-key",
        "no-reply@portal.test",
    );

    mailer.send(&sample_email()).await.unwrap();

    let captured = inbox.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].authorization.as_deref(), Some("Bearer SG.test-key"));
    let body = &captured[0].body;
    assert_eq!(body["personalizations"][0]["to"][0]["email"], "jane@example.com");
    assert_eq!(body["from"]["email"], "no-reply@portal.test");
    assert_eq!(body["subject"], "Your Portal sign-in verification code");
    assert_eq!(body["content"][0]["type"], "text/plain");
    assert_eq!(body["content"][1]["type"], "text/html");
}

#[tokio::test]
async fn should_fail_when_sendgrid_rejects_message() {
    let (server, _inbox) = sendgrid_stub(StatusCode::UNAUTHORIZED).await;
    let mailer = SendGridMailer::new(
        reqwest::Client::new(),
        server.base_url(),
        "SG.bad",
        "no-reply@portal.test",
    );

    let err = mailer.send(&sample_email()).await.unwrap_err();

    assert!(matches!(err, DeliveryError::Provider(ref detail) if detail == "status 401"));
}

// ── Twilio ───────────────────────────────────────────────────────────────────

async fn twilio_stub(status: StatusCode) -> (StubServer, Inbox) {
    let inbox = Inbox::default();
    let router = Router::new()
        .route(
            "/2010-04-01/Accounts/AC123/Messages.json",
            post(
                move |State(inbox): State<Inbox>,
                      headers: HeaderMap,
                      Form(form): Form<HashMap<String, String>>| async move {
                    inbox.lock().unwrap().push(Captured {
                        authorization: authorization(&headers),
                        body: json!(form),
                    });
                    (status, Json(json!({ "sid": "SM0001", "status": "queued" })))
                },
            ),
        )
        .with_state(inbox.clone());
    (StubServer::spawn(router).await, inbox)
}

#[tokio::test]
async fn should_post_sms_form_to_twilio_with_basic_auth() {
    let (server, inbox) = twilio_stub(StatusCode::CREATED).await;
    let sms = TwilioSms::new(
        reqwest::Client::new(),
        server.base_url(),
        "AC123",
        "auth-token",
        "+15550000000",
    );

    sms.send(&sample_sms()).await.unwrap();

    let captured = inbox.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    assert!(
        captured[0]
            .authorization
            .as_deref()
            .is_some_and(|a| a.starts_with("Basic "))
    );
    assert_eq!(captured[0].body["To"], "+15551234567");
    assert_eq!(captured[0].body["From"], "+15550000000");
    assert_eq!(
        captured[0].body["Body"],
        "Portal: your sign-in verification code is 482913."
    );
}

#[tokio::test]
async fn should_fail_when_twilio_rejects_message() {
    let (server, _inbox) = twilio_stub(StatusCode::BAD_REQUEST).await;
    let sms = TwilioSms::new(
        reqwest::Client::new(),
        server.base_url(),
        "AC123",
        "auth-token",
        "+15550000000",
    );

    let err = sms.send(&sample_sms()).await.unwrap_err();

    assert!(matches!(err, DeliveryError::Provider(ref detail) if detail == "status 400"));
}

#[tokio::test]
async fn should_fail_when_provider_is_unreachable() {
    let sms = TwilioSms::new(
        reqwest::Client::new(),
        "http://127.0.0.1:1",
        "AC123",
        "auth-token",
        "+15550000000",
    );

    let err = sms.send(&sample_sms()).await.unwrap_err();

    assert!(matches!(err, DeliveryError::Provider(_)));
}

// ── Provider selection ───────────────────────────────────────────────────────

fn config(extra: &[(&str, &str)]) -> AuthConfig {
    let mut pairs = vec![
        ("DATABASE_URL", "postgres://localhost/portal"),
        ("JWT_SECRET", "secret"),
    ];
    pairs.extend_from_slice(extra);
    AuthConfig::from_pairs(pairs).unwrap()
}

#[tokio::test]
async fn should_report_unconfigured_channels() {
    let cfg = config(&[]);
    let email = EmailProvider::from_config(&cfg, reqwest::Client::new());
    let sms = SmsProvider::from_config(&cfg, reqwest::Client::new());
    assert_eq!(email.name(), "unconfigured");
    assert_eq!(sms.name(), "unconfigured");

    let email_err = email.send(&sample_email()).await.unwrap_err();
    let sms_err = sms.send(&sample_sms()).await.unwrap_err();
    assert!(matches!(email_err, DeliveryError::NotConfigured(Channel::Email)));
    assert!(matches!(sms_err, DeliveryError::NotConfigured(Channel::Sms)));
}

#[test]
fn should_pick_real_providers_when_credentials_present() {
    let cfg = config(&[
        ("SENDGRID_API_KEY", "SG.key"),
        ("MAIL_FROM", "no-reply@portal.test"),
        ("TWILIO_ACCOUNT_SID", "AC123"),
        ("TWILIO_AUTH_TOKEN", "token"),
        ("TWILIO_FROM_NUMBER", "+15550000000"),
    ]);

    assert_eq!(EmailProvider::from_config(&cfg, reqwest::Client::new()).name(), "sendgrid");
    assert_eq!(SmsProvider::from_config(&cfg, reqwest::Client::new()).name(), "twilio");
}

#[test]
fn should_require_sender_identity_for_sendgrid() {
    let cfg = config(&[("SENDGRID_API_KEY", "SG.key")]);

    assert_eq!(
        EmailProvider::from_config(&cfg, reqwest::Client::new()).name(),
        "unconfigured"
    );
}

#[test]
fn should_prefer_console_delivery_when_enabled() {
    let cfg = config(&[("CONSOLE_DELIVERY", "true"), ("SENDGRID_API_KEY", "SG.key")]);

    assert_eq!(EmailProvider::from_config(&cfg, reqwest::Client::new()).name(), "console");
    assert_eq!(SmsProvider::from_config(&cfg, reqwest::Client::new()).name(), "console");
}

// ── Channel routing ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct RecordingEmail(Arc<Mutex<Vec<EmailMessage>>>);

impl EmailSender for RecordingEmail {
    async fn send(&self, message: &EmailMessage) -> Result<(), DeliveryError> {
        self.0.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingSms(Arc<Mutex<Vec<SmsMessage>>>);

impl SmsSender for RecordingSms {
    async fn send(&self, message: &SmsMessage) -> Result<(), DeliveryError> {
        self.0.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[tokio::test]
async fn should_route_code_to_channel_of_destination() {
    let email = RecordingEmail::default();
    let sms = RecordingSms::default();
    let router = ChannelRouter {
        email: email.clone(),
        sms: sms.clone(),
        app_name: "Portal".to_owned(),
    };

    router
        .send_code(
            &Destination::email("jane@example.com"),
            VerificationPurpose::PasswordReset,
            "482913",
        )
        .await
        .unwrap();
    router
        .send_code(
            &Destination::sms("+15551234567"),
            VerificationPurpose::SmsTwoFactor,
            "135790",
        )
        .await
        .unwrap();

    let emails = email.0.lock().unwrap().clone();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, "jane@example.com");
    assert_eq!(emails[0].subject, "Your Portal password reset code");
    assert!(emails[0].text.contains("482913"));

    let texts = sms.0.lock().unwrap().clone();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].to, "+15551234567");
    assert!(texts[0].body.contains("135790"));
}
