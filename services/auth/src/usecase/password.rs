use anyhow::anyhow;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use portal_domain::channel::Destination;
use portal_domain::id::UserId;
use portal_domain::user::{MIN_PASSWORD_LEN, normalize_email};
use portal_domain::verification::VerificationPurpose;

use crate::domain::delivery::CodeSender;
use crate::domain::repository::{UserRepository, VerificationRepository};
use crate::domain::types::AuthUser;
use crate::error::AuthServiceError;
use crate::usecase::verification::{
    DispatchCodeUseCase, DispatchInput, VerifyCodeUseCase, require_well_formed_code,
};

// m=8MiB, t=2, p=1
fn argon2() -> Result<Argon2<'static>, AuthServiceError> {
    let params = Params::new(8192, 2, 1, None).map_err(|e| anyhow!("argon2 params: {e}"))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hash password: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("parse password hash: {e}"))?;
    Ok(argon2()?
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn validate_new_password(password: &str) -> Result<(), AuthServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthServiceError::invalid_input(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn require_credentials(email: &str, password: &str) -> Result<(), AuthServiceError> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(AuthServiceError::invalid_input(
            "Email and password are required",
        ));
    }
    Ok(())
}

/// Look up the account by email and check its password.
///
/// Missing fields fail validation before any lookup. Unknown email and wrong
/// password are indistinguishable to the caller.
pub(crate) async fn check_credentials<U: UserRepository>(
    users: &U,
    email: &str,
    password: &str,
) -> Result<AuthUser, AuthServiceError> {
    require_credentials(email, password)?;
    let user = users
        .find_by_email(&normalize_email(email))
        .await?
        .ok_or(AuthServiceError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash)? {
        return Err(AuthServiceError::InvalidCredentials);
    }
    Ok(user)
}

// ── Request reset ────────────────────────────────────────────────────────────

pub struct RequestPasswordResetUseCase<U, V, D>
where
    U: UserRepository,
    V: VerificationRepository,
    D: CodeSender,
{
    pub users: U,
    pub dispatch: DispatchCodeUseCase<V, D>,
}

impl<U, V, D> RequestPasswordResetUseCase<U, V, D>
where
    U: UserRepository,
    V: VerificationRepository,
    D: CodeSender,
{
    /// Succeeds whether or not the email belongs to an account.
    pub async fn execute(&self, email: &str) -> Result<(), AuthServiceError> {
        let Some(user) = self.users.find_by_email(&normalize_email(email)).await? else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };

        let result = self
            .dispatch
            .execute(DispatchInput {
                subject_id: user.id,
                purpose: VerificationPurpose::PasswordReset,
                destination: Destination::email(user.email),
                payload: None,
            })
            .await;

        match result {
            // Delivery outcome is not reported so the response never reveals the account.
            Err(AuthServiceError::Delivery(_)) => Ok(()),
            other => other,
        }
    }
}

// ── Reset with code ──────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<U: UserRepository, V: VerificationRepository> {
    pub users: U,
    pub verify: VerifyCodeUseCase<V>,
}

impl<U: UserRepository, V: VerificationRepository> ResetPasswordUseCase<U, V> {
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), AuthServiceError> {
        require_well_formed_code(&input.code)?;
        validate_new_password(&input.new_password)?;

        let user = self
            .users
            .find_by_email(&normalize_email(&input.email))
            .await?
            .ok_or(AuthServiceError::InvalidCode)?;

        self.verify
            .execute(user.id, VerificationPurpose::PasswordReset, &input.code)
            .await?;

        let hash = hash_password(&input.new_password)?;
        self.users.update_password(user.id, &hash).await?;
        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }
}

// ── Change (signed in) ───────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub user_id: UserId,
    pub current_password: String,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ChangePasswordUseCase<U> {
    pub async fn execute(&self, input: ChangePasswordInput) -> Result<(), AuthServiceError> {
        let user = self
            .users
            .find_by_id(input.user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        if !verify_password(&input.current_password, &user.password_hash)? {
            return Err(AuthServiceError::InvalidCredentials);
        }
        validate_new_password(&input.new_password)?;

        let hash = hash_password(&input.new_password)?;
        self.users.update_password(user.id, &hash).await?;
        Ok(())
    }
}
