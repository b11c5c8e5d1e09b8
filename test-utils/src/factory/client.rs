use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

pub struct ClientFactory<'a> {
    db: &'a DatabaseConnection,
    tenant_id: i32,
    name: String,
    email: Option<String>,
    phone: Option<String>,
}

impl<'a> ClientFactory<'a> {
    /// Defaults: name `"Client {id}"`, no contact details.
    pub fn new(db: &'a DatabaseConnection, tenant_id: i32) -> Self {
        Self {
            db,
            tenant_id,
            name: format!("Client {}", next_id()),
            email: None,
            phone: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub async fn build(self) -> Result<entity::client::Model, DbErr> {
        let now = Utc::now();
        entity::client::ActiveModel {
            tenant_id: ActiveValue::Set(self.tenant_id),
            name: ActiveValue::Set(self.name),
            email: ActiveValue::Set(self.email),
            phone: ActiveValue::Set(self.phone),
            address: ActiveValue::Set(None),
            notes: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_client(
    db: &DatabaseConnection,
    tenant_id: i32,
) -> Result<entity::client::Model, DbErr> {
    ClientFactory::new(db, tenant_id).build().await
}
