use crate::model::status::{CreateStatusDto, StatusDto, UpdateStatusDto};

pub const DEFAULT_COLOR: &str = "#64748b";

/// A kanban column.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub color: String,
    pub position: i32,
    pub is_completed: bool,
}

impl Status {
    pub fn from_entity(entity: entity::status::Model) -> Self {
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            name: entity.name,
            color: entity.color,
            position: entity.position,
            is_completed: entity.is_completed,
        }
    }

    pub fn into_dto(self) -> StatusDto {
        StatusDto {
            id: self.id,
            name: self.name,
            color: self.color,
            position: self.position,
            is_completed: self.is_completed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateStatusParams {
    pub name: String,
    pub color: String,
    pub is_completed: bool,
}

impl CreateStatusParams {
    pub fn from_dto(dto: CreateStatusDto) -> Self {
        Self {
            name: dto.name.trim().to_string(),
            color: dto.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            is_completed: dto.is_completed,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateStatusParams {
    pub name: Option<String>,
    pub color: Option<String>,
    pub is_completed: Option<bool>,
}

impl UpdateStatusParams {
    pub fn from_dto(dto: UpdateStatusDto) -> Self {
        Self {
            name: dto.name.map(|n| n.trim().to_string()),
            color: dto.color,
            is_completed: dto.is_completed,
        }
    }
}

/// Seeded for every new tenant: `(name, is_completed)` in board order.
pub const DEFAULT_COLUMNS: [(&str, bool); 3] =
    [("To Do", false), ("In Progress", false), ("Done", true)];
