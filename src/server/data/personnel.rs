//! Personnel data repository.
//!
//! Personnel rows are always loaded together with their user so callers get names,
//! emails and phones without a second lookup.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::{
    model::personnel::Role,
    server::model::personnel::Personnel,
};

pub struct PersonnelRepository<'a> {
    db: &'a DatabaseConnection,
}

fn with_user(
    row: (entity::personnel::Model, Option<entity::user::Model>),
) -> Result<Personnel, DbErr> {
    let (personnel, user) = row;
    let user = user.ok_or(DbErr::RecordNotFound(format!(
        "User {} for personnel {} not found",
        personnel.user_id, personnel.id
    )))?;
    Personnel::from_entity(personnel, user)
}

impl<'a> PersonnelRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a personnel record linking `user_id` to `tenant_id`.
    ///
    /// # Arguments
    /// - `active` - False for invitations until the link is consumed
    ///
    /// # Returns
    /// - `Ok(entity::personnel::Model)` - The created row
    /// - `Err(DbErr)` - Insert failed
    pub async fn create(
        &self,
        tenant_id: i32,
        user_id: i32,
        role: Role,
        title: Option<String>,
        active: bool,
    ) -> Result<entity::personnel::Model, DbErr> {
        entity::personnel::ActiveModel {
            tenant_id: ActiveValue::Set(tenant_id),
            user_id: ActiveValue::Set(user_id),
            role: ActiveValue::Set(role.to_string()),
            title: ActiveValue::Set(title),
            active: ActiveValue::Set(active),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    /// Finds personnel by id within a tenant.
    ///
    /// # Returns
    /// - `Ok(Some(Personnel))` - Found in the tenant
    /// - `Ok(None)` - Missing or belongs to another tenant
    /// - `Err(DbErr)` - Database error or unparsable role
    pub async fn find_by_id(&self, tenant_id: i32, id: i32) -> Result<Option<Personnel>, DbErr> {
        let row = entity::prelude::Personnel::find_by_id(id)
            .filter(entity::personnel::Column::TenantId.eq(tenant_id))
            .find_also_related(entity::prelude::User)
            .one(self.db)
            .await?;

        row.map(with_user).transpose()
    }

    /// Finds the personnel record of `user_id` in `tenant_id`, active or not.
    pub async fn find_by_user(
        &self,
        tenant_id: i32,
        user_id: i32,
    ) -> Result<Option<Personnel>, DbErr> {
        let row = entity::prelude::Personnel::find()
            .filter(entity::personnel::Column::TenantId.eq(tenant_id))
            .filter(entity::personnel::Column::UserId.eq(user_id))
            .find_also_related(entity::prelude::User)
            .one(self.db)
            .await?;

        row.map(with_user).transpose()
    }

    /// Gets a page of personnel ordered by user name.
    ///
    /// # Returns
    /// - `Ok((personnel, total))` - The requested page and the total personnel count
    /// - `Err(DbErr)` - Database error during pagination
    pub async fn get_paginated(
        &self,
        tenant_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Personnel>, u64), DbErr> {
        let paginator = entity::prelude::Personnel::find()
            .filter(entity::personnel::Column::TenantId.eq(tenant_id))
            .find_also_related(entity::prelude::User)
            .order_by_asc(entity::user::Column::Name)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page).await?;
        let personnel = rows
            .into_iter()
            .map(with_user)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((personnel, total))
    }

    /// Every personnel record in the tenant, ordered by name.
    pub async fn get_all(&self, tenant_id: i32) -> Result<Vec<Personnel>, DbErr> {
        entity::prelude::Personnel::find()
            .filter(entity::personnel::Column::TenantId.eq(tenant_id))
            .find_also_related(entity::prelude::User)
            .order_by_asc(entity::user::Column::Name)
            .all(self.db)
            .await?
            .into_iter()
            .map(with_user)
            .collect()
    }

    /// Loads the given personnel ids that belong to the tenant, in id order.
    ///
    /// Ids from other tenants or unknown ids are silently skipped, so callers can compare
    /// lengths to validate input.
    pub async fn get_by_ids(&self, tenant_id: i32, ids: &[i32]) -> Result<Vec<Personnel>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        entity::prelude::Personnel::find()
            .filter(entity::personnel::Column::TenantId.eq(tenant_id))
            .filter(entity::personnel::Column::Id.is_in(ids.iter().copied()))
            .find_also_related(entity::prelude::User)
            .order_by_asc(entity::personnel::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(with_user)
            .collect()
    }

    /// Updates role and title.
    ///
    /// # Returns
    /// - `Ok(())` - Updated
    /// - `Err(DbErr::RecordNotFound)` - No personnel with that id
    pub async fn update(&self, id: i32, role: Role, title: Option<String>) -> Result<(), DbErr> {
        let personnel = entity::prelude::Personnel::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(DbErr::RecordNotFound(format!("Personnel {} not found", id)))?;

        let mut active_model: entity::personnel::ActiveModel = personnel.into();
        active_model.role = ActiveValue::Set(role.to_string());
        active_model.title = ActiveValue::Set(title);
        active_model.update(self.db).await?;

        Ok(())
    }

    pub async fn activate(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Personnel::update_many()
            .filter(entity::personnel::Column::Id.eq(id))
            .col_expr(
                entity::personnel::Column::Active,
                sea_orm::sea_query::Expr::value(true),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Counts active owners in the tenant. Invited owners cannot sign in yet and are
    /// not counted.
    pub async fn count_owners(&self, tenant_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Personnel::find()
            .filter(entity::personnel::Column::TenantId.eq(tenant_id))
            .filter(entity::personnel::Column::Role.eq(Role::Owner.to_string()))
            .filter(entity::personnel::Column::Active.eq(true))
            .count(self.db)
            .await
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Personnel::delete_by_id(id)
            .exec(self.db)
            .await?;

        Ok(())
    }
}
