use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CheckInEndReason {
    CheckedOut,
    Stale,
    /// The personnel record was removed while the session was open.
    Removed,
    /// The work order the session was logged against was deleted.
    WorkOrderDeleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CheckInDto {
    pub id: i32,
    pub personnel_id: i32,
    pub work_order_id: Option<i32>,
    pub task_id: Option<i32>,
    pub note: Option<String>,
    pub started_at: DateTime<Utc>,
    pub last_heartbeat_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub end_reason: Option<CheckInEndReason>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StartCheckInDto {
    pub work_order_id: Option<i32>,
    pub task_id: Option<i32>,
    pub note: Option<String>,
}
