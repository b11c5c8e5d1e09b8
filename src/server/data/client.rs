//! Client data repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::server::model::client::{Client, ClientParams};

pub struct ClientRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ClientRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, tenant_id: i32, params: ClientParams) -> Result<Client, DbErr> {
        let now = Utc::now();
        let entity = entity::client::ActiveModel {
            tenant_id: ActiveValue::Set(tenant_id),
            name: ActiveValue::Set(params.name),
            email: ActiveValue::Set(params.email),
            phone: ActiveValue::Set(params.phone),
            address: ActiveValue::Set(params.address),
            notes: ActiveValue::Set(params.notes),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Client::from_entity(entity))
    }

    /// Finds a client by id within a tenant.
    ///
    /// # Returns
    /// - `Ok(Some(Client))` - Found in the tenant
    /// - `Ok(None)` - Missing or owned by another tenant
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_id(&self, tenant_id: i32, id: i32) -> Result<Option<Client>, DbErr> {
        let entity = entity::prelude::Client::find_by_id(id)
            .filter(entity::client::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;

        Ok(entity.map(Client::from_entity))
    }

    /// Gets a page of clients ordered by name.
    ///
    /// `search` matches a substring of the name. SQLite's `LIKE` ignores ASCII case.
    ///
    /// # Returns
    /// - `Ok((clients, total))` - The requested page and total matching count
    /// - `Err(DbErr)` - Database error during pagination
    pub async fn get_paginated(
        &self,
        tenant_id: i32,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Client>, u64), DbErr> {
        let mut query =
            entity::prelude::Client::find().filter(entity::client::Column::TenantId.eq(tenant_id));
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(entity::client::Column::Name.contains(search));
        }

        let paginator = query
            .order_by_asc(entity::client::Column::Name)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let entities = paginator.fetch_page(page).await?;

        Ok((entities.into_iter().map(Client::from_entity).collect(), total))
    }

    /// All clients of the tenant, used for name resolution.
    pub async fn get_all(&self, tenant_id: i32) -> Result<Vec<Client>, DbErr> {
        let entities = entity::prelude::Client::find()
            .filter(entity::client::Column::TenantId.eq(tenant_id))
            .order_by_asc(entity::client::Column::Name)
            .all(self.db)
            .await?;

        Ok(entities.into_iter().map(Client::from_entity).collect())
    }

    /// Replaces all client fields.
    ///
    /// # Returns
    /// - `Ok(Client)` - The updated client
    /// - `Err(DbErr::RecordNotFound)` - No client with that id
    pub async fn update(&self, id: i32, params: ClientParams) -> Result<Client, DbErr> {
        let client = entity::prelude::Client::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(DbErr::RecordNotFound(format!("Client {} not found", id)))?;

        let mut active_model: entity::client::ActiveModel = client.into();
        active_model.name = ActiveValue::Set(params.name);
        active_model.email = ActiveValue::Set(params.email);
        active_model.phone = ActiveValue::Set(params.phone);
        active_model.address = ActiveValue::Set(params.address);
        active_model.notes = ActiveValue::Set(params.notes);
        active_model.updated_at = ActiveValue::Set(Utc::now());

        Ok(Client::from_entity(active_model.update(self.db).await?))
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Client::delete_by_id(id).exec(self.db).await?;

        Ok(())
    }
}
