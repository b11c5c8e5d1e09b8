//! Notification data repository.
//!
//! Notifications belong to a recipient user within a tenant. Read state is a nullable
//! timestamp so marking read is idempotent.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::notification::{NewNotification, Notification};

pub struct NotificationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> NotificationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts one notification for a recipient.
    ///
    /// # Returns
    /// - `Ok(Notification)` - The created, unread notification
    /// - `Err(DbErr)` - Insert failed
    pub async fn create(
        &self,
        tenant_id: i32,
        user_id: i32,
        notification: &NewNotification,
    ) -> Result<Notification, DbErr> {
        let entity = entity::notification::ActiveModel {
            tenant_id: ActiveValue::Set(tenant_id),
            user_id: ActiveValue::Set(user_id),
            kind: ActiveValue::Set(notification.kind.to_string()),
            title: ActiveValue::Set(notification.title.clone()),
            body: ActiveValue::Set(notification.body.clone()),
            task_id: ActiveValue::Set(notification.task_id),
            work_order_id: ActiveValue::Set(notification.work_order_id),
            read_at: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Notification::from_entity(entity)
    }

    /// Gets a page of a user's notifications, newest first.
    ///
    /// # Arguments
    /// - `unread_only` - Skip notifications that have been read
    ///
    /// # Returns
    /// - `Ok((notifications, total))` - The requested page and total matching count
    /// - `Err(DbErr)` - Database error during pagination
    pub async fn get_paginated(
        &self,
        tenant_id: i32,
        user_id: i32,
        unread_only: bool,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Notification>, u64), DbErr> {
        let mut query = entity::prelude::Notification::find()
            .filter(entity::notification::Column::TenantId.eq(tenant_id))
            .filter(entity::notification::Column::UserId.eq(user_id));
        if unread_only {
            query = query.filter(entity::notification::Column::ReadAt.is_null());
        }

        let paginator = query
            .order_by_desc(entity::notification::Column::CreatedAt)
            .order_by_desc(entity::notification::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let notifications = paginator
            .fetch_page(page)
            .await?
            .into_iter()
            .map(Notification::from_entity)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((notifications, total))
    }

    pub async fn count_unread(&self, tenant_id: i32, user_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Notification::find()
            .filter(entity::notification::Column::TenantId.eq(tenant_id))
            .filter(entity::notification::Column::UserId.eq(user_id))
            .filter(entity::notification::Column::ReadAt.is_null())
            .count(self.db)
            .await
    }

    /// Marks one notification read if it belongs to the user.
    ///
    /// # Returns
    /// - `Ok(true)` - The notification is the user's (already read counts)
    /// - `Ok(false)` - No such notification for this user and tenant
    /// - `Err(DbErr)` - Database error
    pub async fn mark_read(
        &self,
        tenant_id: i32,
        user_id: i32,
        id: i32,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let owned = entity::prelude::Notification::find_by_id(id)
            .filter(entity::notification::Column::TenantId.eq(tenant_id))
            .filter(entity::notification::Column::UserId.eq(user_id))
            .count(self.db)
            .await?;
        if owned == 0 {
            return Ok(false);
        }

        entity::prelude::Notification::update_many()
            .filter(entity::notification::Column::Id.eq(id))
            .filter(entity::notification::Column::ReadAt.is_null())
            .col_expr(entity::notification::Column::ReadAt, Expr::value(now))
            .exec(self.db)
            .await?;

        Ok(true)
    }

    /// Marks all of a user's unread notifications read.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of notifications that changed
    /// - `Err(DbErr)` - Database error
    pub async fn mark_all_read(
        &self,
        tenant_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let result = entity::prelude::Notification::update_many()
            .filter(entity::notification::Column::TenantId.eq(tenant_id))
            .filter(entity::notification::Column::UserId.eq(user_id))
            .filter(entity::notification::Column::ReadAt.is_null())
            .col_expr(entity::notification::Column::ReadAt, Expr::value(now))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
