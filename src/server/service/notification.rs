//! In-app notification dispatch and inbox operations.

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{notification::NotificationRepository, personnel::PersonnelRepository},
    error::AppError,
    model::{
        notification::{NewNotification, Notification, NotificationList},
        total_pages,
    },
    realtime::{RealtimeHub, Room},
};

pub struct NotificationService<'a> {
    db: &'a DatabaseConnection,
    realtime: &'a RealtimeHub,
}

impl<'a> NotificationService<'a> {
    pub fn new(db: &'a DatabaseConnection, realtime: &'a RealtimeHub) -> Self {
        Self { db, realtime }
    }

    /// Notifies personnel of the tenant, skipping the actor.
    ///
    /// Recipients are deduplicated and resolved to their users; each gets one row and a
    /// `notification.created` event in their user room. Ids outside the tenant are ignored.
    ///
    /// # Arguments
    /// - `recipients` - Personnel ids, duplicates allowed
    /// - `actor` - Personnel id of whoever caused the notification
    ///
    /// # Returns
    /// - `Ok(Vec<Notification>)` - Created notifications, one per recipient
    /// - `Err(AppError::DbErr)` - Lookup or insert failed
    pub async fn notify(
        &self,
        tenant_id: i32,
        recipients: &[i32],
        actor: Option<i32>,
        notification: &NewNotification,
    ) -> Result<Vec<Notification>, AppError> {
        let mut ids: Vec<i32> = recipients
            .iter()
            .copied()
            .filter(|id| Some(*id) != actor)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let personnel = PersonnelRepository::new(self.db)
            .get_by_ids(tenant_id, &ids)
            .await?;

        let notification_repo = NotificationRepository::new(self.db);
        let mut created = Vec::with_capacity(personnel.len());
        for person in personnel {
            let row = notification_repo
                .create(tenant_id, person.user_id, notification)
                .await?;

            self.realtime.publish(
                tenant_id,
                Room::User(person.user_id),
                "notification.created",
                &row.clone().into_dto(),
            );
            created.push(row);
        }

        Ok(created)
    }

    /// Same as [`notify`](Self::notify), logging failures instead of returning them.
    pub async fn notify_or_log(
        &self,
        tenant_id: i32,
        recipients: &[i32],
        actor: Option<i32>,
        notification: &NewNotification,
    ) {
        if let Err(e) = self
            .notify(tenant_id, recipients, actor, notification)
            .await
        {
            tracing::error!(
                tenant_id,
                kind = %notification.kind,
                "Failed to dispatch notification: {}",
                e
            );
        }
    }

    /// Inbox page for a user, newest first, with their unread count.
    pub async fn get_paginated(
        &self,
        tenant_id: i32,
        user_id: i32,
        unread_only: bool,
        page: u64,
        per_page: u64,
    ) -> Result<NotificationList, AppError> {
        let repo = NotificationRepository::new(self.db);

        let (notifications, total) = repo
            .get_paginated(tenant_id, user_id, unread_only, page, per_page)
            .await?;
        let unread_count = repo.count_unread(tenant_id, user_id).await?;

        Ok(NotificationList {
            notifications,
            unread_count,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    /// Marks one notification read.
    ///
    /// # Returns
    /// - `Ok(())` - Marked, or it was already read
    /// - `Err(AppError::NotFound)` - Not the caller's notification
    pub async fn mark_read(&self, tenant_id: i32, user_id: i32, id: i32) -> Result<(), AppError> {
        let found = NotificationRepository::new(self.db)
            .mark_read(tenant_id, user_id, id, Utc::now())
            .await?;

        if !found {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        Ok(())
    }

    pub async fn mark_all_read(&self, tenant_id: i32, user_id: i32) -> Result<u64, AppError> {
        Ok(NotificationRepository::new(self.db)
            .mark_all_read(tenant_id, user_id, Utc::now())
            .await?)
    }
}
