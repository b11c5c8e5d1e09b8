use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for kanban columns.
pub struct StatusFactory<'a> {
    db: &'a DatabaseConnection,
    tenant_id: i32,
    name: String,
    color: String,
    position: i32,
    is_completed: bool,
}

impl<'a> StatusFactory<'a> {
    /// Defaults: name `"Column {id}"`, color `"#64748b"`, position 0, not completed.
    pub fn new(db: &'a DatabaseConnection, tenant_id: i32) -> Self {
        Self {
            db,
            tenant_id,
            name: format!("Column {}", next_id()),
            color: "#64748b".to_string(),
            position: 0,
            is_completed: false,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    pub fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    pub async fn build(self) -> Result<entity::status::Model, DbErr> {
        entity::status::ActiveModel {
            tenant_id: ActiveValue::Set(self.tenant_id),
            name: ActiveValue::Set(self.name),
            color: ActiveValue::Set(self.color),
            position: ActiveValue::Set(self.position),
            is_completed: ActiveValue::Set(self.is_completed),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

pub async fn create_status(
    db: &DatabaseConnection,
    tenant_id: i32,
) -> Result<entity::status::Model, DbErr> {
    StatusFactory::new(db, tenant_id).build().await
}

/// Creates `To Do`, `In Progress` and `Done` (completed) at positions 0, 1 and 2.
///
/// # Returns
/// - `Ok([todo, in_progress, done])`
/// - `Err(DbErr)` - Insert failed
pub async fn create_default_columns(
    db: &DatabaseConnection,
    tenant_id: i32,
) -> Result<[entity::status::Model; 3], DbErr> {
    let todo = StatusFactory::new(db, tenant_id)
        .name("To Do")
        .position(0)
        .build()
        .await?;
    let in_progress = StatusFactory::new(db, tenant_id)
        .name("In Progress")
        .position(1)
        .build()
        .await?;
    let done = StatusFactory::new(db, tenant_id)
        .name("Done")
        .position(2)
        .completed(true)
        .build()
        .await?;

    Ok([todo, in_progress, done])
}
