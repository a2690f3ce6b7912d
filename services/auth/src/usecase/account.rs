use chrono::Utc;
use uuid::Uuid;

use portal_domain::channel::Destination;
use portal_domain::id::UserId;
use portal_domain::user::{UserRole, is_plausible_email, is_plausible_phone, normalize_email};
use portal_domain::verification::VerificationPurpose;

use crate::domain::delivery::CodeSender;
use crate::domain::repository::{UserRepository, VerificationRepository};
use crate::domain::types::{AuthUser, ProfileUpdate};
use crate::error::AuthServiceError;
use crate::usecase::password::{hash_password, validate_new_password};
use crate::usecase::verification::{
    DispatchCodeUseCase, DispatchInput, VerifyCodeUseCase, require_well_formed_code,
};

fn validate_name(name: &str) -> Result<String, AuthServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthServiceError::invalid_input("Name is required"));
    }
    Ok(name.to_owned())
}

fn validate_phone(phone: &str) -> Result<String, AuthServiceError> {
    let phone = phone.trim();
    if !is_plausible_phone(phone) {
        return Err(AuthServiceError::invalid_input("Invalid phone number"));
    }
    Ok(phone.to_owned())
}

async fn load_user<U: UserRepository>(users: &U, id: UserId) -> Result<AuthUser, AuthServiceError> {
    users
        .find_by_id(id)
        .await?
        .ok_or(AuthServiceError::UserNotFound)
}

// ── SignUp ───────────────────────────────────────────────────────────────────

pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

pub struct SignUpUseCase<U, V, D>
where
    U: UserRepository,
    V: VerificationRepository,
    D: CodeSender,
{
    pub users: U,
    pub dispatch: DispatchCodeUseCase<V, D>,
}

impl<U, V, D> SignUpUseCase<U, V, D>
where
    U: UserRepository,
    V: VerificationRepository,
    D: CodeSender,
{
    pub async fn execute(&self, input: SignUpInput) -> Result<AuthUser, AuthServiceError> {
        let name = validate_name(&input.name)?;
        let email = normalize_email(&input.email);
        if !is_plausible_email(&email) {
            return Err(AuthServiceError::invalid_input("Invalid email address"));
        }
        validate_new_password(&input.password)?;
        let phone = input
            .phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(validate_phone)
            .transpose()?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthServiceError::EmailTaken);
        }

        let now = Utc::now();
        let user = AuthUser {
            id: UserId(Uuid::new_v4()),
            name,
            email,
            password_hash: hash_password(&input.password)?,
            phone,
            two_factor_enabled: false,
            email_verified: false,
            role: UserRole::Member.as_u8(),
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "account created");

        // The account exists either way; the user can request another code later.
        let sent = self
            .dispatch
            .execute(DispatchInput {
                subject_id: user.id,
                purpose: VerificationPurpose::EmailVerification,
                destination: Destination::email(user.email.clone()),
                payload: None,
            })
            .await;
        match sent {
            Ok(()) | Err(AuthServiceError::Delivery(_)) => Ok(user),
            Err(e) => Err(e),
        }
    }
}

// ── VerifyEmail ──────────────────────────────────────────────────────────────

pub struct VerifyEmailUseCase<U: UserRepository, V: VerificationRepository> {
    pub users: U,
    pub verify: VerifyCodeUseCase<V>,
}

impl<U: UserRepository, V: VerificationRepository> VerifyEmailUseCase<U, V> {
    pub async fn execute(&self, email: &str, code: &str) -> Result<(), AuthServiceError> {
        require_well_formed_code(code)?;
        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthServiceError::InvalidCode)?;

        self.verify
            .execute(user.id, VerificationPurpose::EmailVerification, code)
            .await?;
        self.users.mark_email_verified(user.id).await
    }
}

// ── Profile ──────────────────────────────────────────────────────────────────

pub struct GetAccountUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetAccountUseCase<U> {
    pub async fn execute(&self, user_id: UserId) -> Result<AuthUser, AuthServiceError> {
        load_user(&self.users, user_id).await
    }
}

pub struct UpdateAccountInput {
    pub user_id: UserId,
    pub name: Option<String>,
    /// `Some(None)` or an empty string removes the phone number.
    pub phone: Option<Option<String>>,
}

pub struct UpdateAccountUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateAccountUseCase<U> {
    pub async fn execute(&self, input: UpdateAccountInput) -> Result<AuthUser, AuthServiceError> {
        let update = ProfileUpdate {
            name: input.name.as_deref().map(validate_name).transpose()?,
            phone: match input.phone {
                None => None,
                Some(None) => Some(None),
                Some(Some(p)) if p.trim().is_empty() => Some(None),
                Some(Some(p)) => Some(Some(validate_phone(&p)?)),
            },
        };

        load_user(&self.users, input.user_id).await?;
        self.users.update_profile(input.user_id, &update).await?;
        load_user(&self.users, input.user_id).await
    }
}

pub struct SetTwoFactorUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> SetTwoFactorUseCase<U> {
    pub async fn execute(
        &self,
        user_id: UserId,
        enabled: bool,
    ) -> Result<AuthUser, AuthServiceError> {
        load_user(&self.users, user_id).await?;
        self.users.set_two_factor(user_id, enabled).await?;
        tracing::info!(%user_id, enabled, "two-factor setting changed");
        load_user(&self.users, user_id).await
    }
}
