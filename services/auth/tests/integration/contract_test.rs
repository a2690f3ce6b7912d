use axum::body::to_bytes;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::Value;

use portal_auth::domain::delivery::DeliveryError;
use portal_auth::error::AuthServiceError;
use portal_auth::handlers::MessageResponse;
use portal_auth::handlers::password::RESET_REQUESTED;
use portal_auth::handlers::session::{SessionResponse, SignInResponse};
use portal_auth::handlers::two_factor::{CodeSentResponse, CodeVerifiedResponse};
use portal_auth::usecase::two_factor::VerifyTwoFactorCodeOutput;
use portal_domain::channel::Destination;
use portal_testing::fixture::Fixture;
use portal_testing::server::StubServer;

use crate::helpers::spawn_service;

fn fixture(name: &str) -> Value {
    Fixture::load(&format!("contracts/http/auth/{name}.json"))
}

async fn assert_error_matches(error: AuthServiceError, name: &str) {
    let expected = fixture(name);
    let resp = error.into_response();
    assert_eq!(resp.status().as_u16(), Fixture::status(&expected), "{name}");
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, Fixture::body(&expected), "{name}");
}

fn assert_body_matches(body: impl Serialize, name: &str) {
    let actual = serde_json::to_value(body).unwrap();
    assert_eq!(actual, Fixture::body(&fixture(name)), "{name}");
}

// ── Error envelopes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_match_invalid_credentials_contract() {
    assert_error_matches(
        AuthServiceError::InvalidCredentials,
        "sign_in_invalid_credentials",
    )
    .await;
}

#[tokio::test]
async fn should_match_invalid_code_contract() {
    assert_error_matches(AuthServiceError::InvalidCode, "verify_2fa_code_invalid").await;
}

#[tokio::test]
async fn should_match_expired_code_contract() {
    assert_error_matches(AuthServiceError::CodeExpired, "verify_2fa_code_expired").await;
}

#[tokio::test]
async fn should_match_phone_required_contract() {
    assert_error_matches(AuthServiceError::PhoneRequired, "sms_phone_required").await;
}

#[tokio::test]
async fn should_match_delivery_failure_contract() {
    assert_error_matches(
        DeliveryError::Provider("status 503".to_owned()).into(),
        "send_code_failed",
    )
    .await;
}

// ── Success bodies ───────────────────────────────────────────────────────────

#[test]
fn should_match_sign_in_contracts() {
    assert_body_matches(
        SignInResponse {
            success: true,
            two_factor_required: true,
            phone_on_file: Some(false),
        },
        "sign_in_two_factor",
    );
    assert_body_matches(
        SignInResponse {
            success: true,
            two_factor_required: false,
            phone_on_file: None,
        },
        "sign_in_success",
    );
}

#[test]
fn should_match_code_sent_contracts() {
    assert_body_matches(
        CodeSentResponse {
            success: true,
            message: "Verification code sent",
            destination: Destination::email("jane@example.com").masked(),
        },
        "send_2fa_code",
    );
    assert_body_matches(
        CodeSentResponse {
            success: true,
            message: "Verification code sent",
            destination: Destination::sms("+15551234567").masked(),
        },
        "send_sms_code",
    );
}

#[test]
fn should_match_code_verified_contracts() {
    let out = || VerifyTwoFactorCodeOutput {
        email: "jane@example.com".to_owned(),
        password: "correct-horse-battery".to_owned(),
        clearance: "clearance-token".to_owned(),
    };
    assert_body_matches(CodeVerifiedResponse::from(out()), "verify_2fa_code");
    assert_body_matches(CodeVerifiedResponse::from(out()), "verify_sms_code");
}

#[test]
fn should_match_session_contract() {
    assert_body_matches(
        SessionResponse {
            success: true,
            user_id: "0195f3a4-8e4b-7c2d-9a10-3f5e6d7c8b9a".parse().unwrap(),
            user_role: 0,
            access_token_exp: 1_900_000_000,
        },
        "session",
    );
}

#[test]
fn should_match_password_reset_request_contract() {
    assert_body_matches(
        MessageResponse {
            success: true,
            message: RESET_REQUESTED,
        },
        "request_password_reset",
    );
}

// ── Rejections served by the router ──────────────────────────────────────────

/// Replay the fixture's request and return status and JSON body.
async fn replay(server: &StubServer, fixture: &Value) -> (u16, Value) {
    let request = &fixture["request"];
    let method: reqwest::Method = request["method"].as_str().unwrap().parse().unwrap();
    let mut builder =
        reqwest::Client::new().request(method, server.url(request["path"].as_str().unwrap()));
    if let Some(body) = request.get("body") {
        builder = builder.json(body);
    }
    let resp = builder.send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn should_match_unauthenticated_account_contract() {
    let server = spawn_service().await;
    let expected = fixture("account_unauthenticated");

    let (status, body) = replay(&server, &expected).await;

    assert_eq!(status, Fixture::status(&expected));
    assert_eq!(body, Fixture::body(&expected));
}

#[tokio::test]
async fn should_match_missing_credentials_contract() {
    let server = spawn_service().await;
    let expected = fixture("sign_in_missing_credentials");

    let (status, body) = replay(&server, &expected).await;

    assert_eq!(status, Fixture::status(&expected));
    assert_eq!(body, Fixture::body(&expected));
}

#[tokio::test]
async fn should_match_malformed_body_contract() {
    let server = spawn_service().await;
    let expected = fixture("verify_2fa_code_missing_field");

    let (status, body) = replay(&server, &expected).await;

    // The message is the deserializer's own text; only the envelope is pinned.
    assert_eq!(status, Fixture::status(&expected));
    for (key, value) in Fixture::body(&expected).as_object().unwrap() {
        assert_eq!(&body[key], value, "{key}");
    }
    assert!(!body["message"].as_str().unwrap().is_empty());
}
