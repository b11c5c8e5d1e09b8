use chrono::{DateTime, Utc};

use crate::model::client::{ClientDto, ClientInputDto, PaginatedClientsDto};

#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub id: i32,
    pub tenant_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn from_entity(entity: entity::client::Model) -> Self {
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            name: entity.name,
            email: entity.email,
            phone: entity.phone,
            address: entity.address,
            notes: entity.notes,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }

    pub fn into_dto(self) -> ClientDto {
        ClientDto {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedClients {
    pub clients: Vec<Client>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl PaginatedClients {
    pub fn into_dto(self) -> PaginatedClientsDto {
        PaginatedClientsDto {
            clients: self.clients.into_iter().map(Client::into_dto).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

/// Client fields for create and full update.
#[derive(Debug, Clone)]
pub struct ClientParams {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl ClientParams {
    pub fn from_dto(dto: ClientInputDto) -> Self {
        Self {
            name: dto.name.trim().to_string(),
            email: dto.email,
            phone: dto.phone,
            address: dto.address,
            notes: dto.notes,
        }
    }
}
