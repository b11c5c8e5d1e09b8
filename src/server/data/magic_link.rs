//! Magic link persistence.
//!
//! Only SHA-256 digests of tokens are stored. Consumption is a conditional update on
//! `consumed_at IS NULL` so a link can be used at most once even under concurrent
//! requests.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection,
    DbErr, EntityTrait, QueryFilter,
};

use crate::server::model::magic_link::{MagicLink, MagicLinkPurpose};

pub struct MagicLinkRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MagicLinkRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        tenant_id: i32,
        user_id: i32,
        token_hash: String,
        purpose: MagicLinkPurpose,
        expires_at: DateTime<Utc>,
    ) -> Result<MagicLink, DbErr> {
        let entity = entity::magic_link::ActiveModel {
            tenant_id: ActiveValue::Set(tenant_id),
            user_id: ActiveValue::Set(user_id),
            token_hash: ActiveValue::Set(token_hash),
            purpose: ActiveValue::Set(purpose.to_string()),
            expires_at: ActiveValue::Set(expires_at),
            consumed_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        MagicLink::from_entity(entity)
    }

    pub async fn find_by_hash(&self, token_hash: &str) -> Result<Option<MagicLink>, DbErr> {
        entity::prelude::MagicLink::find()
            .filter(entity::magic_link::Column::TokenHash.eq(token_hash))
            .one(self.db)
            .await?
            .map(MagicLink::from_entity)
            .transpose()
    }

    /// Marks a link consumed.
    ///
    /// # Returns
    /// - `Ok(true)` - This call consumed the link
    /// - `Ok(false)` - The link was already consumed
    /// - `Err(DbErr)` - Database error
    pub async fn consume(&self, id: i32, now: DateTime<Utc>) -> Result<bool, DbErr> {
        let result = entity::prelude::MagicLink::update_many()
            .filter(entity::magic_link::Column::Id.eq(id))
            .filter(entity::magic_link::Column::ConsumedAt.is_null())
            .col_expr(entity::magic_link::Column::ConsumedAt, Expr::value(now))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Deletes unconsumed links of one purpose for a user in a tenant.
    pub async fn delete_unconsumed(
        &self,
        tenant_id: i32,
        user_id: i32,
        purpose: MagicLinkPurpose,
    ) -> Result<u64, DbErr> {
        let result = entity::prelude::MagicLink::delete_many()
            .filter(entity::magic_link::Column::TenantId.eq(tenant_id))
            .filter(entity::magic_link::Column::UserId.eq(user_id))
            .filter(entity::magic_link::Column::Purpose.eq(purpose.to_string()))
            .filter(entity::magic_link::Column::ConsumedAt.is_null())
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Deletes links that expired or were consumed before `cutoff`.
    pub async fn purge(&self, cutoff: DateTime<Utc>) -> Result<u64, DbErr> {
        let result = entity::prelude::MagicLink::delete_many()
            .filter(
                Condition::any()
                    .add(entity::magic_link::Column::ExpiresAt.lt(cutoff))
                    .add(entity::magic_link::Column::ConsumedAt.lt(cutoff)),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
