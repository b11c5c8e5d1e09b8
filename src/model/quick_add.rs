use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::task::{Priority, TaskDto};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    CreateTask,
    UpdateTask,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Personnel,
    WorkOrder,
    Task,
    Project,
    Client,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuickAddTextDto {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EntityMatchDto {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub value: String,
    pub symbol: String,
}

/// Names from the draft matched against tenant records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResolvedDraftDto {
    pub assignee_ids: Vec<i32>,
    pub work_order_id: Option<i32>,
    pub client_id: Option<i32>,
    /// Symbol-prefixed names that matched nothing, e.g. `@Jane Doe`.
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskDraftDto {
    pub intent: Intent,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub assignees: Vec<String>,
    pub work_order: Option<String>,
    pub project: Option<String>,
    pub client: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub entities: Vec<EntityMatchDto>,
    pub confidence: f64,
    pub resolved: ResolvedDraftDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuickAddResultDto {
    pub task: TaskDto,
    pub draft: TaskDraftDto,
}
