//! Second-factor code dispatch and verification for sign-in.

use anyhow::anyhow;

use portal_domain::channel::{Channel, Destination};
use portal_domain::user::{is_plausible_phone, normalize_email};

use crate::domain::delivery::CodeSender;
use crate::domain::repository::{UserRepository, VerificationRepository};
use crate::domain::types::ProfileUpdate;
use crate::error::AuthServiceError;
use crate::usecase::password::check_credentials;
use crate::usecase::session::issue_clearance_token;
use crate::usecase::verification::{
    DispatchCodeUseCase, DispatchInput, VerifyCodeUseCase, require_well_formed_code,
};

// ── Send ─────────────────────────────────────────────────────────────────────

pub struct SendTwoFactorCodeInput {
    pub email: String,
    pub password: String,
    pub channel: Channel,
    /// SMS only: overrides the phone number on file.
    pub phone: Option<String>,
}

pub struct SendTwoFactorCodeUseCase<U, V, D>
where
    U: UserRepository,
    V: VerificationRepository,
    D: CodeSender,
{
    pub users: U,
    pub dispatch: DispatchCodeUseCase<V, D>,
}

impl<U, V, D> SendTwoFactorCodeUseCase<U, V, D>
where
    U: UserRepository,
    V: VerificationRepository,
    D: CodeSender,
{
    /// Returns the destination the code went to.
    pub async fn execute(
        &self,
        input: SendTwoFactorCodeInput,
    ) -> Result<Destination, AuthServiceError> {
        // Credentials are checked again so a code is never sent for a guessed email.
        let user = check_credentials(&self.users, &input.email, &input.password).await?;

        let destination = match input.channel {
            Channel::Email => Destination::email(user.email.clone()),
            Channel::Sms => {
                let supplied = input
                    .phone
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty());
                let phone = match supplied {
                    Some(p) if is_plausible_phone(p) => p.to_owned(),
                    Some(_) => return Err(AuthServiceError::invalid_input("Invalid phone number")),
                    None => user.phone.clone().ok_or(AuthServiceError::PhoneRequired)?,
                };
                Destination::sms(phone)
            }
        };

        self.dispatch
            .execute(DispatchInput {
                subject_id: user.id,
                purpose: input.channel.two_factor_purpose(),
                destination: destination.clone(),
                payload: Some(input.password),
            })
            .await?;

        Ok(destination)
    }
}

// ── Verify ───────────────────────────────────────────────────────────────────

pub struct VerifyTwoFactorCodeInput {
    pub email: String,
    pub code: String,
    pub channel: Channel,
}

/// Everything the client needs to finish signing in.
#[derive(Debug)]
pub struct VerifyTwoFactorCodeOutput {
    pub email: String,
    pub password: String,
    pub clearance: String,
}

pub struct VerifyTwoFactorCodeUseCase<U: UserRepository, V: VerificationRepository> {
    pub users: U,
    pub verify: VerifyCodeUseCase<V>,
    pub jwt_secret: String,
}

impl<U: UserRepository, V: VerificationRepository> VerifyTwoFactorCodeUseCase<U, V> {
    pub async fn execute(
        &self,
        input: VerifyTwoFactorCodeInput,
    ) -> Result<VerifyTwoFactorCodeOutput, AuthServiceError> {
        require_well_formed_code(&input.code)?;

        let user = self
            .users
            .find_by_email(&normalize_email(&input.email))
            .await?
            .ok_or(AuthServiceError::InvalidCode)?;

        let verified = self
            .verify
            .execute(user.id, input.channel.two_factor_purpose(), &input.code)
            .await?;

        // A verified SMS destination becomes the phone on file when none exists yet.
        // The code is already consumed here, so a failed write must not fail sign-in.
        if input.channel == Channel::Sms && user.phone.is_none() {
            let update = ProfileUpdate {
                name: None,
                phone: Some(Some(verified.destination.clone())),
            };
            if let Err(e) = self.users.update_profile(user.id, &update).await {
                tracing::warn!(user_id = %user.id, error = %e, "saving verified phone failed");
            }
        }

        let password = verified
            .payload
            .ok_or_else(|| anyhow!("two-factor verification without password payload"))?;
        let clearance = issue_clearance_token(user.id, &self.jwt_secret)?;

        Ok(VerifyTwoFactorCodeOutput {
            email: user.email,
            password,
            clearance,
        })
    }
}
