//! Task domain models.
//!
//! A task sits at a dense position inside one kanban column. Its assignees live in a join
//! table and are loaded alongside the task together with the linked work order title and
//! client name, so a task read from the repository is ready to render on the board.

use chrono::{DateTime, Duration, Months, Utc};
use sea_orm::DbErr;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{
    model::task::{
        BoardColumnDto, BoardDto, CreateTaskDto, PaginatedTasksDto, Priority, Recurrence,
        TaskDto, TimelineEntryDto, UpdateTaskDto,
    },
    server::{
        error::internal::InternalError,
        model::{parse_column, personnel::PersonnelSummary, status::Status},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i32,
    pub tenant_id: i32,
    pub column_id: i32,
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub work_order_id: Option<i32>,
    pub client_id: Option<i32>,
    pub start_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub recurrence: Option<Recurrence>,
    pub reminder_at: Option<DateTime<Utc>>,
    pub reminder_sent: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assignees: Vec<PersonnelSummary>,
    pub work_order_title: Option<String>,
    pub client_name: Option<String>,
}

impl Task {
    /// Converts a task row into the domain model without assignees or linked names.
    ///
    /// # Returns
    /// - `Ok(Task)` - Converted model
    /// - `Err(DbErr::Custom)` - Stored priority or recurrence is not recognised
    pub fn from_entity(entity: entity::task::Model) -> Result<Self, DbErr> {
        let recurrence = match entity.recurrence.as_deref() {
            Some(value) => Some(parse_column("task.recurrence", value)?),
            None => None,
        };

        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            column_id: entity.column_id,
            position: entity.position,
            title: entity.title,
            description: entity.description,
            priority: parse_column("task.priority", &entity.priority)?,
            work_order_id: entity.work_order_id,
            client_id: entity.client_id,
            start_at: entity.start_at,
            due_at: entity.due_at,
            estimated_hours: entity.estimated_hours,
            recurrence,
            reminder_at: entity.reminder_at,
            reminder_sent: entity.reminder_sent,
            completed_at: entity.completed_at,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            assignees: Vec::new(),
            work_order_title: None,
            client_name: None,
        })
    }

    pub fn assignee_ids(&self) -> Vec<i32> {
        self.assignees.iter().map(|a| a.personnel_id).collect()
    }

    pub fn is_assigned(&self, personnel_id: i32) -> bool {
        self.assignees.iter().any(|a| a.personnel_id == personnel_id)
    }

    pub fn into_dto(self) -> TaskDto {
        TaskDto {
            id: self.id,
            column_id: self.column_id,
            position: self.position,
            title: self.title,
            description: self.description,
            priority: self.priority,
            work_order_id: self.work_order_id,
            work_order_title: self.work_order_title,
            client_id: self.client_id,
            client_name: self.client_name,
            start_at: self.start_at,
            due_at: self.due_at,
            estimated_hours: self.estimated_hours,
            recurrence: self.recurrence,
            reminder_at: self.reminder_at,
            reminder_sent: self.reminder_sent,
            completed_at: self.completed_at,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            assignees: self
                .assignees
                .into_iter()
                .map(PersonnelSummary::into_dto)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedTasks {
    pub tasks: Vec<Task>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl PaginatedTasks {
    pub fn into_dto(self) -> PaginatedTasksDto {
        PaginatedTasksDto {
            tasks: self.tasks.into_iter().map(Task::into_dto).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// A kanban column with its visible tasks in position order.
#[derive(Debug, Clone)]
pub struct BoardColumn {
    pub status: Status,
    pub tasks: Vec<Task>,
}

pub fn board_into_dto(columns: Vec<BoardColumn>) -> BoardDto {
    BoardDto {
        columns: columns
            .into_iter()
            .map(|column| BoardColumnDto {
                status: column.status.into_dto(),
                tasks: column.tasks.into_iter().map(Task::into_dto).collect(),
            })
            .collect(),
    }
}

/// Board and list filters. `search` applies to the list only.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub work_order_id: Option<i32>,
    pub assignee_id: Option<i32>,
    pub client_id: Option<i32>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateTaskParams {
    pub title: String,
    pub description: Option<String>,
    pub column_id: Option<i32>,
    pub priority: Priority,
    pub work_order_id: Option<i32>,
    pub client_id: Option<i32>,
    pub start_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub recurrence: Option<Recurrence>,
    pub reminder_at: Option<DateTime<Utc>>,
    pub assignee_ids: Vec<i32>,
}

impl CreateTaskParams {
    pub fn from_dto(dto: CreateTaskDto) -> Self {
        Self {
            title: dto.title.trim().to_string(),
            description: dto.description,
            column_id: dto.column_id,
            priority: dto.priority.unwrap_or_default(),
            work_order_id: dto.work_order_id,
            client_id: dto.client_id,
            start_at: dto.start_at,
            due_at: dto.due_at,
            estimated_hours: dto.estimated_hours,
            recurrence: dto.recurrence,
            reminder_at: dto.reminder_at,
            assignee_ids: dto.assignee_ids,
        }
    }
}

/// Partial update. `None` keeps the stored value, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskParams {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub work_order_id: Option<Option<i32>>,
    pub client_id: Option<Option<i32>>,
    pub start_at: Option<Option<DateTime<Utc>>>,
    pub due_at: Option<Option<DateTime<Utc>>>,
    pub estimated_hours: Option<Option<f64>>,
    pub recurrence: Option<Option<Recurrence>>,
    pub reminder_at: Option<Option<DateTime<Utc>>>,
}

impl UpdateTaskParams {
    pub fn from_dto(dto: UpdateTaskDto) -> Self {
        Self {
            title: dto.title.map(|t| t.trim().to_string()),
            description: dto.description,
            priority: dto.priority,
            work_order_id: dto.work_order_id,
            client_id: dto.client_id,
            start_at: dto.start_at,
            due_at: dto.due_at,
            estimated_hours: dto.estimated_hours,
            recurrence: dto.recurrence,
            reminder_at: dto.reminder_at,
        }
    }

    /// Names of the fields that differ from `task`, in declaration order.
    pub fn changed_fields(&self, task: &Task) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.title.as_ref().is_some_and(|v| *v != task.title) {
            changed.push("title");
        }
        if self.description.as_ref().is_some_and(|v| *v != task.description) {
            changed.push("description");
        }
        if self.priority.is_some_and(|v| v != task.priority) {
            changed.push("priority");
        }
        if self.work_order_id.is_some_and(|v| v != task.work_order_id) {
            changed.push("work_order");
        }
        if self.client_id.is_some_and(|v| v != task.client_id) {
            changed.push("client");
        }
        if self.start_at.is_some_and(|v| v != task.start_at) {
            changed.push("start_at");
        }
        if self.due_at.is_some_and(|v| v != task.due_at) {
            changed.push("due_at");
        }
        if self.estimated_hours.is_some_and(|v| v != task.estimated_hours) {
            changed.push("estimated_hours");
        }
        if self.recurrence.is_some_and(|v| v != task.recurrence) {
            changed.push("recurrence");
        }
        if self.reminder_at.is_some_and(|v| v != task.reminder_at) {
            changed.push("reminder_at");
        }
        changed
    }
}

/// Shifts a task date forward by one recurrence interval.
///
/// Monthly recurrence keeps the day of month and clamps to the last day of shorter months,
/// so Jan 31 becomes Feb 28 (or 29).
pub fn shift_by_recurrence(
    at: DateTime<Utc>,
    recurrence: Recurrence,
) -> Result<DateTime<Utc>, InternalError> {
    let next = match recurrence {
        Recurrence::Daily => at.checked_add_signed(Duration::days(1)),
        Recurrence::Weekly => at.checked_add_signed(Duration::days(7)),
        Recurrence::Monthly => at.checked_add_months(Months::new(1)),
    };
    next.ok_or(InternalError::DateOutOfRange("task recurrence"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum TimelineKind {
    Created,
    Updated,
    Moved,
    Assigned,
    Unassigned,
    Comment,
    Recurred,
    Attachment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub id: i32,
    pub task_id: i32,
    pub actor_id: Option<i32>,
    pub actor_name: Option<String>,
    pub kind: TimelineKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl TimelineEntry {
    pub fn from_entity(
        entity: entity::task_timeline::Model,
        actor_name: Option<String>,
    ) -> Result<Self, DbErr> {
        Ok(Self {
            id: entity.id,
            task_id: entity.task_id,
            actor_id: entity.actor_id,
            actor_name,
            kind: parse_column("task_timeline.kind", &entity.kind)?,
            message: entity.message,
            created_at: entity.created_at,
        })
    }

    pub fn into_dto(self) -> TimelineEntryDto {
        TimelineEntryDto {
            id: self.id,
            task_id: self.task_id,
            actor_id: self.actor_id,
            actor_name: self.actor_name,
            kind: self.kind.to_string(),
            message: self.message,
            created_at: self.created_at,
        }
    }
}
