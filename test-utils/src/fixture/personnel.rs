use chrono::{TimeZone, Utc};
use entity::personnel;

/// Active technician with id 1 in tenant 1 for user 1.
pub fn entity() -> personnel::Model {
    entity_builder().build()
}

pub fn entity_builder() -> PersonnelEntityBuilder {
    PersonnelEntityBuilder {
        model: personnel::Model {
            id: 1,
            tenant_id: 1,
            user_id: 1,
            role: "technician".to_string(),
            title: None,
            active: true,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        },
    }
}

pub struct PersonnelEntityBuilder {
    model: personnel::Model,
}

impl PersonnelEntityBuilder {
    pub fn id(mut self, id: i32) -> Self {
        self.model.id = id;
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.model.role = role.into();
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.model.active = active;
        self
    }

    pub fn build(self) -> personnel::Model {
        self.model
    }
}
