use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use portal_auth_types::cookie::CookieSettings;
use portal_auth_types::session::JwtSecret;

use crate::infra::db::{DbUserRepository, DbVerificationRepository};
use crate::infra::delivery::ChannelRouter;
use crate::infra::mail::EmailProvider;
use crate::infra::sms::SmsProvider;
use crate::usecase::verification::{DispatchCodeUseCase, VerifyCodeUseCase};

pub type Channels = ChannelRouter<EmailProvider, SmsProvider>;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub cookies: CookieSettings,
    pub channels: Channels,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn verification_repo(&self) -> DbVerificationRepository {
        DbVerificationRepository {
            db: self.db.clone(),
        }
    }

    pub fn dispatch(&self) -> DispatchCodeUseCase<DbVerificationRepository, Channels> {
        DispatchCodeUseCase {
            verifications: self.verification_repo(),
            sender: self.channels.clone(),
        }
    }

    pub fn verify(&self) -> VerifyCodeUseCase<DbVerificationRepository> {
        VerifyCodeUseCase {
            verifications: self.verification_repo(),
        }
    }
}

impl FromRef<AppState> for JwtSecret {
    fn from_ref(state: &AppState) -> Self {
        JwtSecret(state.jwt_secret.clone())
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
