use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A kanban column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusDto {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub position: i32,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateStatusDto {
    pub name: String,
    pub color: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusDto {
    pub name: Option<String>,
    pub color: Option<String>,
    pub is_completed: Option<bool>,
}

/// Complete new column order, first to last.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReorderStatusesDto {
    pub ids: Vec<i32>,
}
