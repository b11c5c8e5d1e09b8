//! Kanban column (status) data repository.
//!
//! Columns are kept at dense positions `0..n` per tenant. Callers that insert or delete
//! columns are responsible for compacting via [`StatusRepository::set_positions`].

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::status::{CreateStatusParams, Status, UpdateStatusParams};

pub struct StatusRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> StatusRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends a column after the tenant's last column.
    ///
    /// # Returns
    /// - `Ok(Status)` - The created column
    /// - `Err(DbErr)` - Database error during count or insert
    pub async fn create(
        &self,
        tenant_id: i32,
        params: CreateStatusParams,
    ) -> Result<Status, DbErr> {
        let position = self.count(tenant_id).await? as i32;

        let entity = entity::status::ActiveModel {
            tenant_id: ActiveValue::Set(tenant_id),
            name: ActiveValue::Set(params.name),
            color: ActiveValue::Set(params.color),
            position: ActiveValue::Set(position),
            is_completed: ActiveValue::Set(params.is_completed),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Status::from_entity(entity))
    }

    pub async fn find_by_id(&self, tenant_id: i32, id: i32) -> Result<Option<Status>, DbErr> {
        let entity = entity::prelude::Status::find_by_id(id)
            .filter(entity::status::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;

        Ok(entity.map(Status::from_entity))
    }

    /// All columns of the tenant in board order.
    pub async fn get_all(&self, tenant_id: i32) -> Result<Vec<Status>, DbErr> {
        let entities = entity::prelude::Status::find()
            .filter(entity::status::Column::TenantId.eq(tenant_id))
            .order_by_asc(entity::status::Column::Position)
            .order_by_asc(entity::status::Column::Id)
            .all(self.db)
            .await?;

        Ok(entities.into_iter().map(Status::from_entity).collect())
    }

    pub async fn count(&self, tenant_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Status::find()
            .filter(entity::status::Column::TenantId.eq(tenant_id))
            .count(self.db)
            .await
    }

    /// Updates the provided fields, keeping the rest.
    ///
    /// # Returns
    /// - `Ok(Status)` - The updated column
    /// - `Err(DbErr::RecordNotFound)` - No column with that id
    pub async fn update(&self, id: i32, params: UpdateStatusParams) -> Result<Status, DbErr> {
        let status = entity::prelude::Status::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(DbErr::RecordNotFound(format!("Status {} not found", id)))?;

        let mut active_model: entity::status::ActiveModel = status.into();
        if let Some(name) = params.name {
            active_model.name = ActiveValue::Set(name);
        }
        if let Some(color) = params.color {
            active_model.color = ActiveValue::Set(color);
        }
        if let Some(is_completed) = params.is_completed {
            active_model.is_completed = ActiveValue::Set(is_completed);
        }

        Ok(Status::from_entity(active_model.update(self.db).await?))
    }

    /// Rewrites positions so `ids[i]` sits at position `i`.
    pub async fn set_positions(&self, ids: &[i32]) -> Result<(), DbErr> {
        for (position, id) in ids.iter().enumerate() {
            entity::prelude::Status::update_many()
                .filter(entity::status::Column::Id.eq(*id))
                .col_expr(
                    entity::status::Column::Position,
                    sea_orm::sea_query::Expr::value(position as i32),
                )
                .exec(self.db)
                .await?;
        }
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Status::delete_by_id(id).exec(self.db).await?;

        Ok(())
    }
}
