use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "check_in_session")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tenant_id: i32,
    pub personnel_id: i32,
    pub work_order_id: Option<i32>,
    pub task_id: Option<i32>,
    pub note: Option<String>,
    pub started_at: DateTimeUtc,
    pub last_heartbeat_at: DateTimeUtc,
    pub ended_at: Option<DateTimeUtc>,
    /// `checked_out`, `stale`, `removed` or `work_order_deleted` once closed.
    pub end_reason: Option<String>,
    pub duration_minutes: Option<i32>,
}

/// No foreign keys: sessions outlive the personnel record and work order they
/// were logged against.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
