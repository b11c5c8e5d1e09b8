use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for personnel records. Defaults to an active technician without a title.
pub struct PersonnelFactory<'a> {
    db: &'a DatabaseConnection,
    tenant_id: i32,
    user_id: i32,
    role: String,
    title: Option<String>,
    active: bool,
}

impl<'a> PersonnelFactory<'a> {
    pub fn new(db: &'a DatabaseConnection, tenant_id: i32, user_id: i32) -> Self {
        Self {
            db,
            tenant_id,
            user_id,
            role: "technician".to_string(),
            title: None,
            active: true,
        }
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub async fn build(self) -> Result<entity::personnel::Model, DbErr> {
        entity::personnel::ActiveModel {
            tenant_id: ActiveValue::Set(self.tenant_id),
            user_id: ActiveValue::Set(self.user_id),
            role: ActiveValue::Set(self.role),
            title: ActiveValue::Set(self.title),
            active: ActiveValue::Set(self.active),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_personnel(
    db: &DatabaseConnection,
    tenant_id: i32,
    user_id: i32,
) -> Result<entity::personnel::Model, DbErr> {
    PersonnelFactory::new(db, tenant_id, user_id).build().await
}
