use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for check-in sessions. Defaults to an open session started now.
pub struct CheckInSessionFactory<'a> {
    db: &'a DatabaseConnection,
    tenant_id: i32,
    personnel_id: i32,
    work_order_id: Option<i32>,
    started_at: DateTime<Utc>,
    last_heartbeat_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl<'a> CheckInSessionFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, tenant_id: i32, personnel_id: i32) -> Self {
        let now = Utc::now();
        Self {
            db,
            tenant_id,
            personnel_id,
            work_order_id: None,
            started_at: now,
            last_heartbeat_at: now,
            ended_at: None,
        }
    }

    pub fn work_order_id(mut self, work_order_id: i32) -> Self {
        self.work_order_id = Some(work_order_id);
        self
    }

    pub fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn last_heartbeat_at(mut self, last_heartbeat_at: DateTime<Utc>) -> Self {
        self.last_heartbeat_at = last_heartbeat_at;
        self
    }

    pub fn ended_at(mut self, ended_at: DateTime<Utc>) -> Self {
        self.ended_at = Some(ended_at);
        self
    }

    pub async fn build(self) -> Result<entity::check_in_session::Model, DbErr> {
        entity::check_in_session::ActiveModel {
            tenant_id: ActiveValue::Set(self.tenant_id),
            personnel_id: ActiveValue::Set(self.personnel_id),
            work_order_id: ActiveValue::Set(self.work_order_id),
            task_id: ActiveValue::Set(None),
            note: ActiveValue::Set(None),
            started_at: ActiveValue::Set(self.started_at),
            last_heartbeat_at: ActiveValue::Set(self.last_heartbeat_at),
            ended_at: ActiveValue::Set(self.ended_at),
            end_reason: ActiveValue::Set(self.ended_at.map(|_| "checked_out".to_string())),
            duration_minutes: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}
