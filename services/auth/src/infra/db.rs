use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::{Expr, OnConflict},
};

use portal_auth_schema::{users, verifications};
use portal_core::sea_ext::DbErrExt as _;
use portal_domain::id::{UserId, VerificationId};
use portal_domain::verification::{MAX_VERIFY_ATTEMPTS, VerificationPurpose};

use crate::domain::repository::{UserRepository, VerificationRepository};
use crate::domain::types::{AuthUser, ProfileUpdate, Verification};
use crate::error::AuthServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl DbUserRepository {
    fn touch(id: UserId) -> users::ActiveModel {
        users::ActiveModel {
            id: Set(id.0),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
    }
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<AuthUser>, AuthServiceError> {
        let model = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &AuthUser) -> Result<(), AuthServiceError> {
        let result = users::ActiveModel {
            id: Set(user.id.0),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            phone: Set(user.phone.clone()),
            two_factor_enabled: Set(user.two_factor_enabled),
            email_verified: Set(user.email_verified),
            role: Set(user.role as i16),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.is_unique_violation() => Err(AuthServiceError::EmailTaken),
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), AuthServiceError> {
        let mut am = Self::touch(id);
        am.password_hash = Set(password_hash.to_owned());
        am.update(&self.db).await.context("update password")?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<(), AuthServiceError> {
        let mut am = Self::touch(id);
        if let Some(name) = &update.name {
            am.name = Set(name.clone());
        }
        if let Some(phone) = &update.phone {
            am.phone = Set(phone.clone());
        }
        am.update(&self.db).await.context("update profile")?;
        Ok(())
    }

    async fn set_two_factor(&self, id: UserId, enabled: bool) -> Result<(), AuthServiceError> {
        let mut am = Self::touch(id);
        am.two_factor_enabled = Set(enabled);
        am.update(&self.db).await.context("set two-factor")?;
        Ok(())
    }

    async fn mark_email_verified(&self, id: UserId) -> Result<(), AuthServiceError> {
        let mut am = Self::touch(id);
        am.email_verified = Set(true);
        am.update(&self.db).await.context("mark email verified")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> AuthUser {
    AuthUser {
        id: UserId(model.id),
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        phone: model.phone,
        two_factor_enabled: model.two_factor_enabled,
        email_verified: model.email_verified,
        role: model.role as u8,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Verification repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationRepository {
    pub db: DatabaseConnection,
}

impl VerificationRepository for DbVerificationRepository {
    async fn upsert(&self, record: &Verification) -> Result<(), AuthServiceError> {
        let am = verifications::ActiveModel {
            id: Set(record.id.0),
            subject_id: Set(record.subject_id.0),
            purpose: Set(record.purpose.as_str().to_owned()),
            code: Set(record.code.clone()),
            payload: Set(record.payload.clone()),
            destination: Set(record.destination.clone()),
            attempts: Set(0),
            expires_at: Set(record.expires_at),
            created_at: Set(record.created_at),
        };
        // Every dispatch rotates the row id, so a consume or failed attempt keyed
        // on an earlier read cannot touch a resent code.
        verifications::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([
                    verifications::Column::SubjectId,
                    verifications::Column::Purpose,
                ])
                .update_columns([
                    verifications::Column::Id,
                    verifications::Column::Code,
                    verifications::Column::Payload,
                    verifications::Column::Destination,
                    verifications::Column::Attempts,
                    verifications::Column::ExpiresAt,
                    verifications::Column::CreatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("upsert verification")?;
        Ok(())
    }

    async fn find_active(
        &self,
        subject_id: UserId,
        purpose: VerificationPurpose,
    ) -> Result<Option<Verification>, AuthServiceError> {
        let model = verifications::Entity::find()
            .filter(verifications::Column::SubjectId.eq(subject_id.0))
            .filter(verifications::Column::Purpose.eq(purpose.as_str()))
            .one(&self.db)
            .await
            .context("find active verification")?;
        model.map(verification_from_model).transpose()
    }

    async fn consume(&self, id: VerificationId) -> Result<bool, AuthServiceError> {
        let result = verifications::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .context("consume verification")?;
        Ok(result.rows_affected > 0)
    }

    async fn record_failed_attempt(&self, id: VerificationId) -> Result<i32, AuthServiceError> {
        let updated = verifications::Entity::update_many()
            .col_expr(
                verifications::Column::Attempts,
                Expr::col(verifications::Column::Attempts).add(1),
            )
            .filter(verifications::Column::Id.eq(id.0))
            .exec_with_returning(&self.db)
            .await
            .context("record failed verification attempt")?;
        // No row means the code was consumed or replaced by a resend.
        Ok(updated
            .first()
            .map(|m| m.attempts)
            .unwrap_or(MAX_VERIFY_ATTEMPTS))
    }
}

fn verification_from_model(
    model: verifications::Model,
) -> Result<Verification, AuthServiceError> {
    let purpose = model
        .purpose
        .parse::<VerificationPurpose>()
        .with_context(|| format!("verification {} has unknown purpose", model.id))?;
    Ok(Verification {
        id: VerificationId(model.id),
        subject_id: UserId(model.subject_id),
        purpose,
        code: model.code,
        payload: model.payload,
        destination: model.destination,
        attempts: model.attempts,
        expires_at: model.expires_at,
        created_at: model.created_at,
    })
}
