use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::{
    model::notification::{NotificationDto, NotificationKind, NotificationListDto},
    server::model::parse_column,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: i32,
    pub tenant_id: i32,
    pub user_id: i32,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub task_id: Option<i32>,
    pub work_order_id: Option<i32>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn from_entity(entity: entity::notification::Model) -> Result<Self, DbErr> {
        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            user_id: entity.user_id,
            kind: parse_column("notification.kind", &entity.kind)?,
            title: entity.title,
            body: entity.body,
            task_id: entity.task_id,
            work_order_id: entity.work_order_id,
            read_at: entity.read_at,
            created_at: entity.created_at,
        })
    }

    pub fn into_dto(self) -> NotificationDto {
        NotificationDto {
            id: self.id,
            kind: self.kind,
            title: self.title,
            body: self.body,
            task_id: self.task_id,
            work_order_id: self.work_order_id,
            read_at: self.read_at,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl NotificationList {
    pub fn into_dto(self) -> NotificationListDto {
        NotificationListDto {
            notifications: self
                .notifications
                .into_iter()
                .map(Notification::into_dto)
                .collect(),
            unread_count: self.unread_count,
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// Content of a notification before recipients are known.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub task_id: Option<i32>,
    pub work_order_id: Option<i32>,
}

impl NewNotification {
    pub fn for_task(kind: NotificationKind, task_id: i32, title: String, body: String) -> Self {
        Self {
            kind,
            title,
            body,
            task_id: Some(task_id),
            work_order_id: None,
        }
    }

    pub fn for_work_order(
        kind: NotificationKind,
        work_order_id: i32,
        title: String,
        body: String,
    ) -> Self {
        Self {
            kind,
            title,
            body,
            task_id: None,
            work_order_id: Some(work_order_id),
        }
    }
}
