use chrono::{DateTime, TimeZone, Utc};
use entity::task;

/// Medium priority task with id 1 in column 1 at position 0, with no dates.
pub fn entity() -> task::Model {
    entity_builder().build()
}

pub fn entity_builder() -> TaskEntityBuilder {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    TaskEntityBuilder {
        model: task::Model {
            id: 1,
            tenant_id: 1,
            column_id: 1,
            position: 0,
            title: "Replace boiler valve".to_string(),
            description: None,
            priority: "medium".to_string(),
            work_order_id: None,
            client_id: None,
            start_at: None,
            due_at: None,
            estimated_hours: None,
            recurrence: None,
            reminder_at: None,
            reminder_sent: false,
            completed_at: None,
            created_by: Some(1),
            created_at: created,
            updated_at: created,
        },
    }
}

pub struct TaskEntityBuilder {
    model: task::Model,
}

impl TaskEntityBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.model.title = title.into();
        self
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.model.priority = priority.into();
        self
    }

    pub fn recurrence(mut self, recurrence: impl Into<String>) -> Self {
        self.model.recurrence = Some(recurrence.into());
        self
    }

    pub fn start_at(mut self, start_at: DateTime<Utc>) -> Self {
        self.model.start_at = Some(start_at);
        self
    }

    pub fn due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.model.due_at = Some(due_at);
        self
    }

    pub fn reminder_at(mut self, reminder_at: DateTime<Utc>) -> Self {
        self.model.reminder_at = Some(reminder_at);
        self
    }

    pub fn build(self) -> task::Model {
        self.model
    }
}
