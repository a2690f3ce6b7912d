//! Dispatch and verification of one-time codes.

use chrono::{Duration, Utc};
use uuid::Uuid;

use portal_domain::channel::Destination;
use portal_domain::id::{UserId, VerificationId};
use portal_domain::verification::{
    CODE_TTL_SECS, MAX_VERIFY_ATTEMPTS, VerificationPurpose, is_well_formed_code,
};

use crate::domain::delivery::CodeSender;
use crate::domain::repository::VerificationRepository;
use crate::domain::types::Verification;
use crate::error::AuthServiceError;
use crate::usecase::code::{codes_match, generate_code};

// ── Dispatch ─────────────────────────────────────────────────────────────────

pub struct DispatchInput {
    pub subject_id: UserId,
    pub purpose: VerificationPurpose,
    pub destination: Destination,
    pub payload: Option<String>,
}

pub struct DispatchCodeUseCase<V: VerificationRepository, D: CodeSender> {
    pub verifications: V,
    pub sender: D,
}

impl<V: VerificationRepository, D: CodeSender> DispatchCodeUseCase<V, D> {
    /// Store a fresh code for `(subject, purpose)` and send it.
    ///
    /// The stored record survives a delivery failure; the caller may resend.
    pub async fn execute(&self, input: DispatchInput) -> Result<(), AuthServiceError> {
        let now = Utc::now();
        let code = generate_code();
        let record = Verification {
            id: VerificationId(Uuid::new_v4()),
            subject_id: input.subject_id,
            purpose: input.purpose,
            code: code.clone(),
            payload: input.payload,
            destination: input.destination.target().to_owned(),
            attempts: 0,
            expires_at: now + Duration::seconds(CODE_TTL_SECS),
            created_at: now,
        };
        self.verifications.upsert(&record).await?;

        if let Err(e) = self
            .sender
            .send_code(&input.destination, input.purpose, &code)
            .await
        {
            tracing::warn!(
                error = %e,
                purpose = %input.purpose,
                destination = %input.destination.masked(),
                "code delivery failed"
            );
            return Err(e.into());
        }

        tracing::info!(
            purpose = %input.purpose,
            destination = %input.destination.masked(),
            "verification code dispatched"
        );
        Ok(())
    }
}

// ── Verify ───────────────────────────────────────────────────────────────────

/// Reject submissions that are not exactly six digits before touching storage.
pub(crate) fn require_well_formed_code(code: &str) -> Result<(), AuthServiceError> {
    if is_well_formed_code(code) {
        Ok(())
    } else {
        Err(AuthServiceError::invalid_input("Code must be 6 digits"))
    }
}

/// Data released by a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCode {
    pub payload: Option<String>,
    pub destination: String,
}

pub struct VerifyCodeUseCase<V: VerificationRepository> {
    pub verifications: V,
}

impl<V: VerificationRepository> VerifyCodeUseCase<V> {
    pub async fn execute(
        &self,
        subject_id: UserId,
        purpose: VerificationPurpose,
        submitted: &str,
    ) -> Result<VerifiedCode, AuthServiceError> {
        let record = self
            .verifications
            .find_active(subject_id, purpose)
            .await?
            .ok_or(AuthServiceError::InvalidCode)?;

        if record.is_expired_at(Utc::now()) {
            self.verifications.consume(record.id).await?;
            return Err(AuthServiceError::CodeExpired);
        }

        if !codes_match(&record.code, submitted) {
            let attempts = self.verifications.record_failed_attempt(record.id).await?;
            if attempts >= MAX_VERIFY_ATTEMPTS {
                tracing::info!(%purpose, attempts, "verification discarded after failed attempts");
                self.verifications.consume(record.id).await?;
            }
            return Err(AuthServiceError::InvalidCode);
        }

        // A concurrent verify may have removed the row between lookup and delete.
        if !self.verifications.consume(record.id).await? {
            return Err(AuthServiceError::InvalidCode);
        }

        Ok(VerifiedCode {
            payload: record.payload,
            destination: record.destination,
        })
    }
}
