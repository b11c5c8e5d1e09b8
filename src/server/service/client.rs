use sea_orm::DatabaseConnection;

use crate::server::{
    data::client::ClientRepository,
    error::AppError,
    model::{
        client::{Client, ClientParams, PaginatedClients},
        total_pages,
    },
};

pub struct ClientService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ClientService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Page of clients ordered by name.
    ///
    /// # Arguments
    /// - `search` - Case-insensitive substring of the client name
    pub async fn get_paginated(
        &self,
        tenant_id: i32,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedClients, AppError> {
        let (clients, total) = ClientRepository::new(self.db)
            .get_paginated(tenant_id, search, page, per_page)
            .await?;

        Ok(PaginatedClients {
            clients,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    pub async fn get(&self, tenant_id: i32, id: i32) -> Result<Client, AppError> {
        ClientRepository::new(self.db)
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
    }

    pub async fn create(&self, tenant_id: i32, params: ClientParams) -> Result<Client, AppError> {
        if params.name.is_empty() {
            return Err(AppError::BadRequest("Client name is required".to_string()));
        }

        Ok(ClientRepository::new(self.db)
            .create(tenant_id, params)
            .await?)
    }

    /// Replaces every client field.
    pub async fn update(
        &self,
        tenant_id: i32,
        id: i32,
        params: ClientParams,
    ) -> Result<Client, AppError> {
        let client = self.get(tenant_id, id).await?;
        if params.name.is_empty() {
            return Err(AppError::BadRequest("Client name is required".to_string()));
        }

        Ok(ClientRepository::new(self.db)
            .update(client.id, params)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};

    /// Tests searching clients by a lowercase fragment.
    ///
    /// Expected: only the matching client, total 1
    #[tokio::test]
    async fn searches_case_insensitively() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let tenant = factory::create_tenant(db).await?;
        factory::client::ClientFactory::new(db, tenant.id)
            .name("Acme Plumbing")
            .build()
            .await?;
        factory::client::ClientFactory::new(db, tenant.id)
            .name("Northwind Electric")
            .build()
            .await?;

        let page = ClientService::new(db)
            .get_paginated(tenant.id, Some(" acme "), 0, 10)
            .await?;

        assert_eq!(page.total, 1);
        assert_eq!(page.clients[0].name, "Acme Plumbing");

        Ok(())
    }

    /// Tests updating a client owned by another tenant.
    ///
    /// Expected: Err(AppError::NotFound)
    #[tokio::test]
    async fn update_hides_other_tenant() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let tenant = factory::create_tenant(db).await?;
        let other = factory::create_tenant(db).await?;
        let foreign = factory::create_client(db, other.id).await?;

        let result = ClientService::new(db)
            .update(
                tenant.id,
                foreign.id,
                ClientParams {
                    name: "Renamed".to_string(),
                    email: None,
                    phone: None,
                    address: None,
                    notes: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));

        Ok(())
    }
}
