//! Work order domain models and the progress rollup.

use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::{
    model::{
        task::Priority,
        work_order::{
            CreateWorkOrderDto, PaginatedWorkOrdersDto, UpdateWorkOrderDto, WorkOrderDto,
            WorkOrderStatus,
        },
    },
    server::model::{parse_column, personnel::PersonnelSummary},
};

#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrder {
    pub id: i32,
    pub tenant_id: i32,
    pub client_id: Option<i32>,
    pub client_name: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: WorkOrderStatus,
    pub priority: Priority,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub progress: i32,
    pub task_count: i32,
    pub completed_task_count: i32,
    pub personnel: Vec<PersonnelSummary>,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkOrder {
    /// Converts a work order row; crew and client name are filled in by the repository.
    pub fn from_entity(entity: entity::work_order::Model) -> Result<Self, DbErr> {
        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            client_id: entity.client_id,
            client_name: None,
            title: entity.title,
            description: entity.description,
            status: parse_column("work_order.status", &entity.status)?,
            priority: parse_column("work_order.priority", &entity.priority)?,
            scheduled_at: entity.scheduled_at,
            due_at: entity.due_at,
            progress: entity.progress,
            task_count: entity.task_count,
            completed_task_count: entity.completed_task_count,
            personnel: Vec::new(),
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }

    pub fn personnel_ids(&self) -> Vec<i32> {
        self.personnel.iter().map(|p| p.personnel_id).collect()
    }

    pub fn into_dto(self) -> WorkOrderDto {
        WorkOrderDto {
            id: self.id,
            client_id: self.client_id,
            client_name: self.client_name,
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            scheduled_at: self.scheduled_at,
            due_at: self.due_at,
            progress: self.progress,
            task_count: self.task_count,
            completed_task_count: self.completed_task_count,
            personnel: self
                .personnel
                .into_iter()
                .map(PersonnelSummary::into_dto)
                .collect(),
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedWorkOrders {
    pub work_orders: Vec<WorkOrder>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl PaginatedWorkOrders {
    pub fn into_dto(self) -> PaginatedWorkOrdersDto {
        PaginatedWorkOrdersDto {
            work_orders: self
                .work_orders
                .into_iter()
                .map(WorkOrder::into_dto)
                .collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkOrderFilter {
    pub status: Option<WorkOrderStatus>,
    pub client_id: Option<i32>,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateWorkOrderParams {
    pub title: String,
    pub description: Option<String>,
    pub client_id: Option<i32>,
    pub priority: Priority,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub personnel_ids: Vec<i32>,
}

impl CreateWorkOrderParams {
    pub fn from_dto(dto: CreateWorkOrderDto) -> Self {
        Self {
            title: dto.title.trim().to_string(),
            description: dto.description,
            client_id: dto.client_id,
            priority: dto.priority.unwrap_or_default(),
            scheduled_at: dto.scheduled_at,
            due_at: dto.due_at,
            personnel_ids: dto.personnel_ids,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateWorkOrderParams {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub client_id: Option<Option<i32>>,
    pub priority: Option<Priority>,
    pub status: Option<WorkOrderStatus>,
    pub scheduled_at: Option<Option<DateTime<Utc>>>,
    pub due_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateWorkOrderParams {
    pub fn from_dto(dto: UpdateWorkOrderDto) -> Self {
        Self {
            title: dto.title.map(|t| t.trim().to_string()),
            description: dto.description,
            client_id: dto.client_id,
            priority: dto.priority,
            status: dto.status,
            scheduled_at: dto.scheduled_at,
            due_at: dto.due_at,
        }
    }
}

/// Result of rolling task completion up into a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollup {
    pub task_count: i32,
    pub completed_task_count: i32,
    pub progress: i32,
    pub status: WorkOrderStatus,
}

/// Computes counts, progress and status from linked task completion.
///
/// Progress rounds half up. A cancelled work order stays cancelled and a work order
/// without tasks keeps its current status.
pub fn rollup(current: WorkOrderStatus, total: i32, completed: i32) -> Rollup {
    let progress = if total > 0 {
        (completed * 200 + total) / (2 * total)
    } else {
        0
    };

    let status = match current {
        WorkOrderStatus::Cancelled => WorkOrderStatus::Cancelled,
        _ if total > 0 && completed == total => WorkOrderStatus::Completed,
        _ if completed > 0 => WorkOrderStatus::InProgress,
        WorkOrderStatus::Completed if total > 0 => WorkOrderStatus::Pending,
        other => other,
    };

    Rollup {
        task_count: total,
        completed_task_count: completed,
        progress,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_progress_half_up() {
        assert_eq!(rollup(WorkOrderStatus::Pending, 3, 1).progress, 33);
        assert_eq!(rollup(WorkOrderStatus::Pending, 3, 2).progress, 67);
        assert_eq!(rollup(WorkOrderStatus::Pending, 8, 1).progress, 13);
        assert_eq!(rollup(WorkOrderStatus::Pending, 0, 0).progress, 0);
    }

    /// Tests status transitions as tasks complete and reopen.
    ///
    /// Expected: pending → in_progress → completed, then back to in_progress or pending
    #[test]
    fn transitions_status_with_completion() {
        assert_eq!(
            rollup(WorkOrderStatus::Pending, 2, 1).status,
            WorkOrderStatus::InProgress
        );
        assert_eq!(
            rollup(WorkOrderStatus::InProgress, 2, 2).status,
            WorkOrderStatus::Completed
        );
        assert_eq!(
            rollup(WorkOrderStatus::Completed, 3, 2).status,
            WorkOrderStatus::InProgress
        );
        assert_eq!(
            rollup(WorkOrderStatus::Completed, 3, 0).status,
            WorkOrderStatus::Pending
        );
        assert_eq!(
            rollup(WorkOrderStatus::InProgress, 2, 0).status,
            WorkOrderStatus::InProgress
        );
    }

    #[test]
    fn keeps_cancelled_and_empty_work_orders() {
        assert_eq!(
            rollup(WorkOrderStatus::Cancelled, 2, 2).status,
            WorkOrderStatus::Cancelled
        );
        assert_eq!(
            rollup(WorkOrderStatus::Completed, 0, 0).status,
            WorkOrderStatus::Completed
        );
        assert_eq!(
            rollup(WorkOrderStatus::Pending, 0, 0).status,
            WorkOrderStatus::Pending
        );
    }
}
