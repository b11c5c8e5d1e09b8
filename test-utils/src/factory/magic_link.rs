use crate::factory::helpers::next_id;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for magic link rows.
///
/// The stored `token_hash` is whatever the caller supplies; tests that need to
/// consume a link should hash a known token themselves.
pub struct MagicLinkFactory<'a> {
    db: &'a DatabaseConnection,
    tenant_id: i32,
    user_id: i32,
    token_hash: String,
    purpose: String,
    expires_at: DateTime<Utc>,
    consumed_at: Option<DateTime<Utc>>,
}

impl<'a> MagicLinkFactory<'a> {
    /// Defaults: a unique placeholder hash, `login` purpose, expiring in 30 minutes.
    pub fn new(db: &'a DatabaseConnection, tenant_id: i32, user_id: i32) -> Self {
        Self {
            db,
            tenant_id,
            user_id,
            token_hash: format!("hash-{}", next_id()),
            purpose: "login".to_string(),
            expires_at: Utc::now() + Duration::minutes(30),
            consumed_at: None,
        }
    }

    pub fn token_hash(mut self, token_hash: impl Into<String>) -> Self {
        self.token_hash = token_hash.into();
        self
    }

    pub fn purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn consumed_at(mut self, consumed_at: DateTime<Utc>) -> Self {
        self.consumed_at = Some(consumed_at);
        self
    }

    pub async fn build(self) -> Result<entity::magic_link::Model, DbErr> {
        entity::magic_link::ActiveModel {
            tenant_id: ActiveValue::Set(self.tenant_id),
            user_id: ActiveValue::Set(self.user_id),
            token_hash: ActiveValue::Set(self.token_hash),
            purpose: ActiveValue::Set(self.purpose),
            expires_at: ActiveValue::Set(self.expires_at),
            consumed_at: ActiveValue::Set(self.consumed_at),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}
