use chrono::{DateTime, Utc};

use portal_domain::id::{UserId, VerificationId};
use portal_domain::verification::VerificationPurpose;

/// Account data the auth service needs for credential checks and profile reads.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub two_factor_enabled: bool,
    pub email_verified: bool,
    pub role: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored one-time code for a `(subject, purpose)` pair.
#[derive(Debug, Clone)]
pub struct Verification {
    pub id: VerificationId,
    pub subject_id: UserId,
    pub purpose: VerificationPurpose,
    pub code: String,
    /// Released to the caller only after a successful match.
    pub payload: Option<String>,
    pub destination: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Verification {
    /// Codes are invalid at or after `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Fields changed by a profile edit. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    /// `Some(None)` clears the phone number.
    pub phone: Option<Option<String>>,
}

/// Lifetime of a two-factor clearance token in seconds.
pub const CLEARANCE_TTL_SECS: u64 = 300;
