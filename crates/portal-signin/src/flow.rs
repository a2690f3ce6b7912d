use std::collections::VecDeque;

use crate::api::{AuthApi, SessionInfo, SignInOutcome};
use crate::state::{Effect, Event, SignInModel, SignInState, Toast, reduce};

/// Drives [`reduce`] against a live [`AuthApi`].
///
/// Each call to [`SignInFlow::dispatch`] runs the whole effect chain the event
/// starts (e.g. verify, then finalize, then session refresh) before returning.
pub struct SignInFlow<A: AuthApi> {
    api: A,
    model: SignInModel,
    toasts: Vec<Toast>,
    location: Option<String>,
    session: Option<SessionInfo>,
}

impl<A: AuthApi> SignInFlow<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            model: SignInModel::default(),
            toasts: Vec::new(),
            location: None,
            session: None,
        }
    }

    pub fn state(&self) -> &SignInState {
        &self.model.state
    }

    pub fn is_pending(&self) -> bool {
        self.model.pending
    }

    /// Route requested by the last navigation effect.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Toasts raised since the last call, oldest first.
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    pub async fn dispatch(&mut self, event: Event) -> &SignInState {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let (model, effects) = reduce(self.model.clone(), event);
            self.model = model;
            for effect in effects {
                if let Some(result) = self.run(effect).await {
                    queue.push_back(result);
                }
            }
        }
        &self.model.state
    }

    async fn run(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::SubmitCredentials { email, password } => {
                Some(match self.api.sign_in(&email, &password, None).await {
                    Ok(SignInOutcome::TwoFactorRequired { phone_on_file }) => {
                        Event::TwoFactorRequired {
                            email,
                            password,
                            phone_on_file,
                        }
                    }
                    Ok(SignInOutcome::SignedIn) => Event::SignedIn,
                    Err(e) => Event::CredentialsRejected {
                        message: e.server_message().map(str::to_owned),
                    },
                })
            }
            Effect::SendCode {
                channel,
                email,
                password,
                phone,
            } => Some(
                match self
                    .api
                    .send_code(channel, &email, &password, phone.as_deref())
                    .await
                {
                    Ok(()) => Event::CodeSent { channel, phone },
                    Err(e) => {
                        tracing::warn!(error = %e, %channel, "send code failed");
                        Event::CodeSendFailed {
                            message: e.server_message().map(str::to_owned),
                        }
                    }
                },
            ),
            Effect::VerifyCode {
                channel,
                email,
                code,
            } => Some(match self.api.verify_code(channel, &email, &code).await {
                Ok(payload) => Event::CodeVerified(payload),
                Err(e) => Event::CodeRejected {
                    message: e.server_message().map(str::to_owned),
                },
            }),
            Effect::FinalizeSignIn {
                email,
                password,
                clearance,
            } => Some(
                match self
                    .api
                    .sign_in(&email, &password, clearance.as_deref())
                    .await
                {
                    Ok(SignInOutcome::SignedIn) => Event::SessionEstablished,
                    // The service still wants a second factor: the clearance was not accepted.
                    Ok(SignInOutcome::TwoFactorRequired { .. }) => {
                        Event::SessionFailed { message: None }
                    }
                    Err(e) => Event::SessionFailed {
                        message: e.server_message().map(str::to_owned),
                    },
                },
            ),
            Effect::Navigate(path) => {
                self.location = Some(path);
                None
            }
            Effect::RefreshSession => {
                match self.api.fetch_session().await {
                    Ok(info) => self.session = Some(info),
                    Err(e) => tracing::warn!(error = %e, "session refresh failed"),
                }
                None
            }
            Effect::Toast(toast) => {
                self.toasts.push(toast);
                None
            }
        }
    }
}
