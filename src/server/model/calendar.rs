//! Calendar events built from tasks and work orders.

use chrono::{DateTime, Utc};

use crate::{
    model::{
        calendar::{CalendarEventDto, CalendarEventKind},
        task::Priority,
        work_order::WorkOrderStatus,
    },
    server::model::{task::Task, work_order::WorkOrder},
};

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub kind: CalendarEventKind,
    pub id: i32,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub work_order_id: Option<i32>,
    pub completed: bool,
}

fn in_range(at: Option<DateTime<Utc>>, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    at.is_some_and(|at| at >= from && at < to)
}

/// Placement of a dated span: starts at `start` when set, otherwise at `due`.
fn place(
    start: Option<DateTime<Utc>>,
    due: Option<DateTime<Utc>>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Option<(DateTime<Utc>, Option<DateTime<Utc>>)> {
    if !in_range(start, from, to) && !in_range(due, from, to) {
        return None;
    }
    match (start, due) {
        (Some(start), due) => Some((start, due)),
        (None, Some(due)) => Some((due, None)),
        (None, None) => None,
    }
}

impl CalendarEvent {
    /// Event for a task whose start or due date falls in `[from, to)`.
    pub fn from_task(task: &Task, from: DateTime<Utc>, to: DateTime<Utc>) -> Option<Self> {
        let (start, end) = place(task.start_at, task.due_at, from, to)?;
        Some(Self {
            kind: CalendarEventKind::Task,
            id: task.id,
            title: task.title.clone(),
            start,
            end,
            priority: task.priority,
            work_order_id: task.work_order_id,
            completed: task.completed_at.is_some(),
        })
    }

    /// Event for a work order whose scheduled or due date falls in `[from, to)`.
    pub fn from_work_order(
        work_order: &WorkOrder,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Option<Self> {
        let (start, end) = place(work_order.scheduled_at, work_order.due_at, from, to)?;
        Some(Self {
            kind: CalendarEventKind::WorkOrder,
            id: work_order.id,
            title: work_order.title.clone(),
            start,
            end,
            priority: work_order.priority,
            work_order_id: Some(work_order.id),
            completed: work_order.status == WorkOrderStatus::Completed,
        })
    }

    pub fn into_dto(self) -> CalendarEventDto {
        CalendarEventDto {
            kind: self.kind,
            id: self.id,
            title: self.title,
            start: self.start,
            end: self.end,
            priority: self.priority,
            work_order_id: self.work_order_id,
            completed: self.completed,
        }
    }
}
