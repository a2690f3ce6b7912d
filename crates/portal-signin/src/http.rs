//! [`AuthApi`] over HTTP.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use portal_domain::channel::Channel;

use crate::api::{ApiError, AuthApi, SessionInfo, SignInOutcome, VerifiedPayload};

/// Client for the portal auth service.
///
/// Keeps a cookie store so the session set by sign-in is sent on later calls.
#[derive(Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInBody {
    two_factor_required: bool,
    #[serde(default)]
    phone_on_file: bool,
}

#[derive(Deserialize)]
struct VerifiedBody {
    data: VerifiedPayload,
}

#[derive(Deserialize)]
struct ErrorBody {
    kind: Option<String>,
    message: Option<String>,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Use a preconfigured client. It should have a cookie store enabled.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        // Error bodies are best effort; a proxy page must not hide the status.
        let body = resp.json::<ErrorBody>().await.ok();
        Err(ApiError::Rejected {
            status: status.as_u16(),
            kind: body.as_ref().and_then(|b| b.kind.clone()),
            message: body.and_then(|b| b.message),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl AuthApi for HttpAuthApi {
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
        clearance: Option<&str>,
    ) -> Result<SignInOutcome, ApiError> {
        let mut body = json!({ "email": email, "password": password });
        if let Some(clearance) = clearance {
            body["clearance"] = json!(clearance);
        }
        let resp: SignInBody = self
            .send_json(self.request(Method::POST, "/api/auth/sign-in").json(&body))
            .await?;
        Ok(if resp.two_factor_required {
            SignInOutcome::TwoFactorRequired {
                phone_on_file: resp.phone_on_file,
            }
        } else {
            SignInOutcome::SignedIn
        })
    }

    async fn send_code(
        &self,
        channel: Channel,
        email: &str,
        password: &str,
        phone: Option<&str>,
    ) -> Result<(), ApiError> {
        let builder = match channel {
            Channel::Email => self
                .request(Method::POST, "/api/auth/send-2fa-code")
                .json(&json!({ "email": email, "password": password })),
            Channel::Sms => self
                .request(Method::POST, "/api/auth/sms/send-code")
                .json(&json!({ "email": email, "password": password, "phone": phone })),
        };
        self.send(builder).await?;
        Ok(())
    }

    async fn verify_code(
        &self,
        channel: Channel,
        email: &str,
        code: &str,
    ) -> Result<VerifiedPayload, ApiError> {
        let builder = match channel {
            Channel::Email => self.request(Method::POST, "/api/auth/verify-2fa-code"),
            Channel::Sms => self.request(Method::PUT, "/api/auth/sms/verify-code"),
        };
        let body: VerifiedBody = self
            .send_json(builder.json(&json!({ "email": email, "code": code })))
            .await?;
        Ok(body.data)
    }

    async fn fetch_session(&self) -> Result<SessionInfo, ApiError> {
        self.send_json(self.request(Method::GET, "/api/auth/session"))
            .await
    }
}
