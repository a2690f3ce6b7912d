#![allow(async_fn_in_trait)]

use portal_domain::id::{UserId, VerificationId};
use portal_domain::verification::VerificationPurpose;

use crate::domain::types::{AuthUser, ProfileUpdate, Verification};
use crate::error::AuthServiceError;

/// Repository for portal accounts.
pub trait UserRepository: Send + Sync {
    /// Lookup by normalized (lowercase) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthServiceError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<AuthUser>, AuthServiceError>;

    /// Insert a new account. Fails with `EmailTaken` on a duplicate email.
    async fn create(&self, user: &AuthUser) -> Result<(), AuthServiceError>;

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), AuthServiceError>;

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), AuthServiceError>;

    async fn set_two_factor(&self, id: UserId, enabled: bool) -> Result<(), AuthServiceError>;

    async fn mark_email_verified(&self, id: UserId) -> Result<(), AuthServiceError>;
}

/// Code Store: one active verification record per `(subject, purpose)`.
pub trait VerificationRepository: Send + Sync {
    /// Insert, or replace code/payload/destination/expiry of the existing record
    /// for the same `(subject, purpose)`. Last write wins.
    async fn upsert(&self, record: &Verification) -> Result<(), AuthServiceError>;

    /// Current record for the pair, expired or not.
    async fn find_active(
        &self,
        subject_id: UserId,
        purpose: VerificationPurpose,
    ) -> Result<Option<Verification>, AuthServiceError>;

    /// Delete the record. Returns `true` only for the call that removed the row.
    async fn consume(&self, id: VerificationId) -> Result<bool, AuthServiceError>;

    /// Bump the failed-attempt counter and return the new value.
    async fn record_failed_attempt(&self, id: VerificationId) -> Result<i32, AuthServiceError>;
}
