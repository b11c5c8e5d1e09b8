use chrono::{DateTime, Utc};

use crate::model::tenant::TenantDto;

#[derive(Debug, Clone, PartialEq)]
pub struct Tenant {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn from_entity(entity: entity::tenant::Model) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            slug: entity.slug,
            timezone: entity.timezone,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> TenantDto {
        TenantDto {
            id: self.id,
            name: self.name,
            slug: self.slug,
            timezone: self.timezone,
            created_at: self.created_at,
        }
    }
}
