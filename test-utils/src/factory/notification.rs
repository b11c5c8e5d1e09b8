use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct NotificationFactory<'a> {
    db: &'a DatabaseConnection,
    tenant_id: i32,
    user_id: i32,
    kind: String,
    read: bool,
}

impl<'a> NotificationFactory<'a> {
    /// Defaults to an unread `assigned` notification.
    pub fn new(db: &'a DatabaseConnection, tenant_id: i32, user_id: i32) -> Self {
        Self {
            db,
            tenant_id,
            user_id,
            kind: "assigned".to_string(),
            read: false,
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    pub async fn build(self) -> Result<entity::notification::Model, DbErr> {
        let now = Utc::now();
        entity::notification::ActiveModel {
            tenant_id: ActiveValue::Set(self.tenant_id),
            user_id: ActiveValue::Set(self.user_id),
            kind: ActiveValue::Set(self.kind),
            title: ActiveValue::Set("Test notification".to_string()),
            body: ActiveValue::Set("Something happened".to_string()),
            task_id: ActiveValue::Set(None),
            work_order_id: ActiveValue::Set(None),
            read_at: ActiveValue::Set(self.read.then_some(now)),
            created_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}
