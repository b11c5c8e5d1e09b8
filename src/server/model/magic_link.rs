use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::server::model::parse_column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum MagicLinkPurpose {
    Login,
    /// Sent to the owner at signup.
    Activation,
    Invitation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MagicLink {
    pub id: i32,
    pub tenant_id: i32,
    pub user_id: i32,
    pub purpose: MagicLinkPurpose,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl MagicLink {
    pub fn from_entity(entity: entity::magic_link::Model) -> Result<Self, DbErr> {
        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            user_id: entity.user_id,
            purpose: parse_column("magic_link.purpose", &entity.purpose)?,
            expires_at: entity.expires_at,
            consumed_at: entity.consumed_at,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// A freshly issued link. The plain token only exists here; the database keeps its digest.
#[derive(Debug, Clone)]
pub struct IssuedMagicLink {
    pub token: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
