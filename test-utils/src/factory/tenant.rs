use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for tenants.
///
/// Defaults: name `"Tenant {id}"`, slug `"tenant-{id}"`, timezone `"UTC"`.
pub struct TenantFactory<'a> {
    db: &'a DatabaseConnection,
    name: String,
    slug: String,
    timezone: String,
}

impl<'a> TenantFactory<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            name: format!("Tenant {}", id),
            slug: format!("tenant-{}", id),
            timezone: "UTC".to_string(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub async fn build(self) -> Result<entity::tenant::Model, DbErr> {
        entity::tenant::ActiveModel {
            name: ActiveValue::Set(self.name),
            slug: ActiveValue::Set(self.slug),
            timezone: ActiveValue::Set(self.timezone),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_tenant(db: &DatabaseConnection) -> Result<entity::tenant::Model, DbErr> {
    TenantFactory::new(db).build().await
}
