use crate::factory::helpers::next_id;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct WorkOrderFactory<'a> {
    db: &'a DatabaseConnection,
    tenant_id: i32,
    client_id: Option<i32>,
    title: String,
    status: String,
    priority: String,
    scheduled_at: Option<DateTime<Utc>>,
    due_at: Option<DateTime<Utc>>,
}

impl<'a> WorkOrderFactory<'a> {
    /// Defaults: title `"Work Order {id}"`, `pending`, `medium` priority, no client.
    pub fn new(db: &'a DatabaseConnection, tenant_id: i32) -> Self {
        Self {
            db,
            tenant_id,
            client_id: None,
            title: format!("Work Order {}", next_id()),
            status: "pending".to_string(),
            priority: "medium".to_string(),
            scheduled_at: None,
            due_at: None,
        }
    }

    pub fn client_id(mut self, client_id: i32) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn scheduled_at(mut self, scheduled_at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(scheduled_at);
        self
    }

    pub fn due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub async fn build(self) -> Result<entity::work_order::Model, DbErr> {
        let now = Utc::now();
        entity::work_order::ActiveModel {
            tenant_id: ActiveValue::Set(self.tenant_id),
            client_id: ActiveValue::Set(self.client_id),
            title: ActiveValue::Set(self.title),
            description: ActiveValue::Set(None),
            status: ActiveValue::Set(self.status),
            priority: ActiveValue::Set(self.priority),
            scheduled_at: ActiveValue::Set(self.scheduled_at),
            due_at: ActiveValue::Set(self.due_at),
            progress: ActiveValue::Set(0),
            task_count: ActiveValue::Set(0),
            completed_task_count: ActiveValue::Set(0),
            created_by: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_work_order(
    db: &DatabaseConnection,
    tenant_id: i32,
) -> Result<entity::work_order::Model, DbErr> {
    WorkOrderFactory::new(db, tenant_id).build().await
}

/// Links a personnel record to a work order.
pub async fn assign_personnel(
    db: &DatabaseConnection,
    work_order_id: i32,
    personnel_id: i32,
) -> Result<entity::work_order_personnel::Model, DbErr> {
    entity::work_order_personnel::ActiveModel {
        work_order_id: ActiveValue::Set(work_order_id),
        personnel_id: ActiveValue::Set(personnel_id),
        assigned_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}
