//! Tenant data repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter,
};

use crate::server::model::tenant::Tenant;

pub const DEFAULT_TIMEZONE: &str = "UTC";

pub struct TenantRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TenantRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a tenant with the default timezone.
    ///
    /// # Arguments
    /// - `name` - Display name
    /// - `slug` - Unique URL-safe identifier, already checked with [`Self::slug_exists`]
    ///
    /// # Returns
    /// - `Ok(Tenant)` - The created tenant
    /// - `Err(DbErr)` - Insert failed, including a unique violation on `slug`
    pub async fn create(&self, name: String, slug: String) -> Result<Tenant, DbErr> {
        let entity = entity::tenant::ActiveModel {
            name: ActiveValue::Set(name),
            slug: ActiveValue::Set(slug),
            timezone: ActiveValue::Set(DEFAULT_TIMEZONE.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Tenant::from_entity(entity))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Tenant>, DbErr> {
        let entity = entity::prelude::Tenant::find_by_id(id).one(self.db).await?;

        Ok(entity.map(Tenant::from_entity))
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DbErr> {
        let entity = entity::prelude::Tenant::find()
            .filter(entity::tenant::Column::Slug.eq(slug))
            .one(self.db)
            .await?;

        Ok(entity.map(Tenant::from_entity))
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = entity::prelude::Tenant::find()
            .filter(entity::tenant::Column::Slug.eq(slug))
            .count(self.db)
            .await?;

        Ok(count > 0)
    }

    /// Updates name and timezone.
    ///
    /// # Returns
    /// - `Ok(Tenant)` - The updated tenant
    /// - `Err(DbErr::RecordNotFound)` - No tenant with that id
    pub async fn update(&self, id: i32, name: String, timezone: String) -> Result<Tenant, DbErr> {
        let tenant = entity::prelude::Tenant::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(DbErr::RecordNotFound(format!("Tenant {} not found", id)))?;

        let mut active_model: entity::tenant::ActiveModel = tenant.into();
        active_model.name = ActiveValue::Set(name);
        active_model.timezone = ActiveValue::Set(timezone);

        Ok(Tenant::from_entity(active_model.update(self.db).await?))
    }
}
