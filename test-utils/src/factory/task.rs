use crate::factory::helpers::next_id;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for tasks.
///
/// The caller picks the column and position; the factory does not compact or shift
/// neighbouring tasks.
pub struct TaskFactory<'a> {
    db: &'a DatabaseConnection,
    tenant_id: i32,
    column_id: i32,
    position: i32,
    title: String,
    priority: String,
    work_order_id: Option<i32>,
    client_id: Option<i32>,
    start_at: Option<DateTime<Utc>>,
    due_at: Option<DateTime<Utc>>,
    recurrence: Option<String>,
    reminder_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl<'a> TaskFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, tenant_id: i32, column_id: i32) -> Self {
        Self {
            db,
            tenant_id,
            column_id,
            position: 0,
            title: format!("Task {}", next_id()),
            priority: "medium".to_string(),
            work_order_id: None,
            client_id: None,
            start_at: None,
            due_at: None,
            recurrence: None,
            reminder_at: None,
            completed_at: None,
        }
    }

    pub fn position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn work_order_id(mut self, work_order_id: i32) -> Self {
        self.work_order_id = Some(work_order_id);
        self
    }

    pub fn client_id(mut self, client_id: i32) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn start_at(mut self, start_at: DateTime<Utc>) -> Self {
        self.start_at = Some(start_at);
        self
    }

    pub fn due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    pub fn recurrence(mut self, recurrence: impl Into<String>) -> Self {
        self.recurrence = Some(recurrence.into());
        self
    }

    pub fn reminder_at(mut self, reminder_at: DateTime<Utc>) -> Self {
        self.reminder_at = Some(reminder_at);
        self
    }

    pub fn completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    pub async fn build(self) -> Result<entity::task::Model, DbErr> {
        let now = Utc::now();
        entity::task::ActiveModel {
            tenant_id: ActiveValue::Set(self.tenant_id),
            column_id: ActiveValue::Set(self.column_id),
            position: ActiveValue::Set(self.position),
            title: ActiveValue::Set(self.title),
            description: ActiveValue::Set(None),
            priority: ActiveValue::Set(self.priority),
            work_order_id: ActiveValue::Set(self.work_order_id),
            client_id: ActiveValue::Set(self.client_id),
            start_at: ActiveValue::Set(self.start_at),
            due_at: ActiveValue::Set(self.due_at),
            estimated_hours: ActiveValue::Set(None),
            recurrence: ActiveValue::Set(self.recurrence),
            reminder_at: ActiveValue::Set(self.reminder_at),
            reminder_sent: ActiveValue::Set(false),
            completed_at: ActiveValue::Set(self.completed_at),
            created_by: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_task(
    db: &DatabaseConnection,
    tenant_id: i32,
    column_id: i32,
) -> Result<entity::task::Model, DbErr> {
    TaskFactory::new(db, tenant_id, column_id).build().await
}

/// Adds a personnel record to a task's assignees.
pub async fn assign(
    db: &DatabaseConnection,
    task_id: i32,
    personnel_id: i32,
) -> Result<entity::task_assignee::Model, DbErr> {
    entity::task_assignee::ActiveModel {
        task_id: ActiveValue::Set(task_id),
        personnel_id: ActiveValue::Set(personnel_id),
        assigned_at: ActiveValue::Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}
