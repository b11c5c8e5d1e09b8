use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{task::TaskRepository, work_order::WorkOrderRepository},
    error::AppError,
    model::calendar::CalendarEvent,
};

pub const MAX_RANGE_DAYS: i64 = 366;

pub struct CalendarService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CalendarService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Tasks and work orders dated within `[from, to)`, ordered by start.
    ///
    /// # Arguments
    /// - `viewer` - `None` for managers, otherwise only tasks and work orders visible to
    ///   this personnel id
    ///
    /// # Returns
    /// - `Ok(Vec<CalendarEvent>)` - Events sorted by start, tasks before work orders on ties
    /// - `Err(AppError::BadRequest)` - `from` is not before `to`, or the span exceeds a year
    pub async fn get_events(
        &self,
        tenant_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        viewer: Option<i32>,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        if from >= to {
            return Err(AppError::BadRequest("`from` must be before `to`".to_string()));
        }
        if to - from > Duration::days(MAX_RANGE_DAYS) {
            return Err(AppError::BadRequest(format!(
                "Range may span at most {} days",
                MAX_RANGE_DAYS
            )));
        }

        let tasks = TaskRepository::new(self.db)
            .get_in_range(tenant_id, from, to, viewer)
            .await?;
        let work_orders = WorkOrderRepository::new(self.db)
            .get_in_range(tenant_id, from, to, viewer)
            .await?;

        let mut events: Vec<CalendarEvent> = tasks
            .iter()
            .filter_map(|task| CalendarEvent::from_task(task, from, to))
            .chain(
                work_orders
                    .iter()
                    .filter_map(|work_order| CalendarEvent::from_work_order(work_order, from, to)),
            )
            .collect();
        events.sort_by_key(|event| event.start);

        Ok(events)
    }
}
