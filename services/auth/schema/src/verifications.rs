use sea_orm::entity::prelude::*;

/// One-time verification code, one row per `(subject_id, purpose)`.
/// Expires 10 minutes after dispatch; deleted when consumed or found expired.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "verifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub subject_id: Uuid,
    /// `email_2fa`, `sms_2fa`, `password_reset` or `email_verification`.
    pub purpose: String,
    pub code: String,
    /// Side data released on successful verification.
    pub payload: Option<String>,
    /// Address or phone number the code was sent to.
    pub destination: String,
    pub attempts: i32,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SubjectId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
