//! Sign-in state machine.
//!
//! Phases: `Credentials -> MethodSelection -> AwaitingCode(channel) -> Verified`.
//! Every transition goes through [`reduce`]; side effects are returned as data.

use portal_domain::channel::Channel;
use portal_domain::user::is_plausible_phone;
use portal_domain::verification::is_well_formed_code;

use crate::api::VerifiedPayload;

pub const MSG_INVALID_CODE_FORMAT: &str = "Please enter a valid 6-digit code";
pub const MSG_INVALID_CODE: &str = "Invalid or expired code";
pub const MSG_SEND_FAILED: &str = "Failed to send code";
pub const MSG_SIGN_IN_FAILED: &str = "Sign in failed";
pub const MSG_CODE_SENT: &str = "Verification code sent";
pub const MSG_CREDENTIALS_REQUIRED: &str = "Email and password are required";
pub const MSG_PHONE_REQUIRED: &str = "Phone number required";
pub const MSG_INVALID_PHONE: &str = "Please enter a valid phone number";

/// Route opened once the session is established.
pub const HOME_ROUTE: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInState {
    Credentials,
    MethodSelection {
        email: String,
        password: String,
        phone_on_file: bool,
    },
    AwaitingCode {
        email: String,
        password: String,
        channel: Channel,
        /// Number the SMS code went to; `None` for email or the number on file.
        phone: Option<String>,
        /// What the user has typed so far.
        code: String,
    },
    Verified,
}

impl SignInState {
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Credentials => "credentials",
            Self::MethodSelection { .. } => "method-selection",
            Self::AwaitingCode {
                channel: Channel::Email,
                ..
            } => "awaiting-code(email)",
            Self::AwaitingCode {
                channel: Channel::Sms,
                ..
            } => "awaiting-code(sms)",
            Self::Verified => "verified",
        }
    }
}

/// Flow state plus the in-flight marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInModel {
    pub state: SignInState,
    /// A network call is outstanding; user events are ignored until it settles.
    pub pending: bool,
}

impl Default for SignInModel {
    fn default() -> Self {
        Self {
            state: SignInState::Credentials,
            pending: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // user input
    Submit { email: String, password: String },
    SelectMethod { channel: Channel, phone: Option<String> },
    ChangeCode(String),
    Resend,
    Verify,
    Back,

    // call results
    TwoFactorRequired {
        email: String,
        password: String,
        phone_on_file: bool,
    },
    SignedIn,
    CredentialsRejected { message: Option<String> },
    CodeSent { channel: Channel, phone: Option<String> },
    CodeSendFailed { message: Option<String> },
    CodeVerified(VerifiedPayload),
    CodeRejected { message: Option<String> },
    SessionEstablished,
    SessionFailed { message: Option<String> },
}

impl Event {
    fn is_user_input(&self) -> bool {
        matches!(
            self,
            Self::Submit { .. }
                | Self::SelectMethod { .. }
                | Self::ChangeCode(_)
                | Self::Resend
                | Self::Verify
                | Self::Back
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitCredentials {
        email: String,
        password: String,
    },
    SendCode {
        channel: Channel,
        email: String,
        password: String,
        phone: Option<String>,
    },
    VerifyCode {
        channel: Channel,
        email: String,
        code: String,
    },
    FinalizeSignIn {
        email: String,
        password: String,
        clearance: Option<String>,
    },
    Navigate(String),
    RefreshSession,
    Toast(Toast),
}

impl Effect {
    /// Effects that are remote calls and keep the model pending.
    pub fn is_call(&self) -> bool {
        matches!(
            self,
            Self::SubmitCredentials { .. }
                | Self::SendCode { .. }
                | Self::VerifyCode { .. }
                | Self::FinalizeSignIn { .. }
        )
    }
}

fn error_toast(message: Option<String>, fallback: &str) -> Effect {
    Effect::Toast(Toast::error(
        message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_owned()),
    ))
}

fn finish() -> Vec<Effect> {
    vec![Effect::Navigate(HOME_ROUTE.to_owned()), Effect::RefreshSession]
}

/// Apply `event` to `model`, returning the next model and the effects to run.
///
/// Events that make no sense in the current phase leave the model unchanged.
pub fn reduce(model: SignInModel, event: Event) -> (SignInModel, Vec<Effect>) {
    if model.pending && event.is_user_input() {
        return (model, vec![]);
    }

    let (state, effects) = transition(model.state, event);
    let pending = effects.iter().any(Effect::is_call);
    (SignInModel { state, pending }, effects)
}

fn transition(state: SignInState, event: Event) -> (SignInState, Vec<Effect>) {
    use SignInState::*;

    match (state, event) {
        // ── credentials ──────────────────────────────────────────────────
        (Credentials, Event::Submit { email, password }) => {
            let email = email.trim().to_owned();
            if email.is_empty() || password.is_empty() {
                return (
                    Credentials,
                    vec![Effect::Toast(Toast::error(MSG_CREDENTIALS_REQUIRED))],
                );
            }
            (Credentials, vec![Effect::SubmitCredentials { email, password }])
        }
        (
            Credentials,
            Event::TwoFactorRequired {
                email,
                password,
                phone_on_file,
            },
        ) => (
            MethodSelection {
                email,
                password,
                phone_on_file,
            },
            vec![],
        ),
        (Credentials, Event::SignedIn) => (Verified, finish()),
        (Credentials, Event::CredentialsRejected { message }) => {
            (Credentials, vec![error_toast(message, MSG_SIGN_IN_FAILED)])
        }

        // ── method selection ─────────────────────────────────────────────
        (
            MethodSelection {
                email,
                password,
                phone_on_file,
            },
            Event::SelectMethod { channel, phone },
        ) => {
            let supplied = phone
                .map(|p| p.trim().to_owned())
                .filter(|p| !p.is_empty());
            let phone = match (channel, supplied) {
                (Channel::Email, _) => None,
                (Channel::Sms, Some(p)) if is_plausible_phone(&p) => Some(p),
                (Channel::Sms, Some(_)) => {
                    return (
                        MethodSelection {
                            email,
                            password,
                            phone_on_file,
                        },
                        vec![Effect::Toast(Toast::error(MSG_INVALID_PHONE))],
                    );
                }
                (Channel::Sms, None) if phone_on_file => None,
                (Channel::Sms, None) => {
                    return (
                        MethodSelection {
                            email,
                            password,
                            phone_on_file,
                        },
                        vec![Effect::Toast(Toast::error(MSG_PHONE_REQUIRED))],
                    );
                }
            };
            let effect = Effect::SendCode {
                channel,
                email: email.clone(),
                password: password.clone(),
                phone,
            };
            (
                MethodSelection {
                    email,
                    password,
                    phone_on_file,
                },
                vec![effect],
            )
        }
        (
            MethodSelection {
                email, password, ..
            },
            Event::CodeSent { channel, phone },
        ) => (
            AwaitingCode {
                email,
                password,
                channel,
                phone,
                code: String::new(),
            },
            vec![Effect::Toast(Toast::success(MSG_CODE_SENT))],
        ),
        (state @ MethodSelection { .. }, Event::CodeSendFailed { message }) => {
            (state, vec![error_toast(message, MSG_SEND_FAILED)])
        }

        // ── awaiting code ────────────────────────────────────────────────
        (
            AwaitingCode {
                email,
                password,
                channel,
                phone,
                ..
            },
            Event::ChangeCode(code),
        ) => (
            AwaitingCode {
                email,
                password,
                channel,
                phone,
                code,
            },
            vec![],
        ),
        (
            AwaitingCode {
                email,
                password,
                channel,
                phone,
                code,
            },
            Event::Resend,
        ) => {
            let effect = Effect::SendCode {
                channel,
                email: email.clone(),
                password: password.clone(),
                phone: phone.clone(),
            };
            (
                AwaitingCode {
                    email,
                    password,
                    channel,
                    phone,
                    code,
                },
                vec![effect],
            )
        }
        (state @ AwaitingCode { .. }, Event::CodeSent { .. }) => {
            (state, vec![Effect::Toast(Toast::success(MSG_CODE_SENT))])
        }
        (state @ AwaitingCode { .. }, Event::CodeSendFailed { message }) => {
            (state, vec![error_toast(message, MSG_SEND_FAILED)])
        }
        (
            AwaitingCode {
                email,
                password,
                channel,
                phone,
                code,
            },
            Event::Verify,
        ) => {
            let effect = if is_well_formed_code(&code) {
                Effect::VerifyCode {
                    channel,
                    email: email.clone(),
                    code: code.trim().to_owned(),
                }
            } else {
                Effect::Toast(Toast::error(MSG_INVALID_CODE_FORMAT))
            };
            (
                AwaitingCode {
                    email,
                    password,
                    channel,
                    phone,
                    code,
                },
                vec![effect],
            )
        }
        (state @ AwaitingCode { .. }, Event::CodeRejected { message }) => {
            (state, vec![error_toast(message, MSG_INVALID_CODE)])
        }
        (state @ AwaitingCode { .. }, Event::CodeVerified(payload)) => (
            state,
            vec![Effect::FinalizeSignIn {
                email: payload.email,
                password: payload.password,
                clearance: payload.clearance,
            }],
        ),
        (AwaitingCode { .. }, Event::SessionEstablished) => (Verified, finish()),
        (state @ AwaitingCode { .. }, Event::SessionFailed { message }) => {
            (state, vec![error_toast(message, MSG_SIGN_IN_FAILED)])
        }

        // ── back ─────────────────────────────────────────────────────────
        (MethodSelection { .. } | AwaitingCode { .. }, Event::Back) => (Credentials, vec![]),

        (state, event) => {
            tracing::debug!(phase = state.phase(), ?event, "ignored sign-in event");
            (state, vec![])
        }
    }
}
