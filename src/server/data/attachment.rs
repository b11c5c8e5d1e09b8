use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::attachment::{Attachment, NewAttachment};

pub struct AttachmentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AttachmentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        tenant_id: i32,
        attachment: NewAttachment,
    ) -> Result<Attachment, DbErr> {
        let entity = entity::attachment::ActiveModel {
            tenant_id: ActiveValue::Set(tenant_id),
            task_id: ActiveValue::Set(attachment.task_id),
            file_name: ActiveValue::Set(attachment.file_name),
            content_type: ActiveValue::Set(attachment.content_type),
            size_bytes: ActiveValue::Set(attachment.size_bytes),
            storage_key: ActiveValue::Set(attachment.storage_key),
            uploaded_by: ActiveValue::Set(attachment.uploaded_by),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(Attachment::from_entity(entity))
    }

    pub async fn find_by_id(&self, tenant_id: i32, id: i32) -> Result<Option<Attachment>, DbErr> {
        let entity = entity::prelude::Attachment::find_by_id(id)
            .filter(entity::attachment::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;

        Ok(entity.map(Attachment::from_entity))
    }

    pub async fn get_by_task(&self, task_id: i32) -> Result<Vec<Attachment>, DbErr> {
        let entities = entity::prelude::Attachment::find()
            .filter(entity::attachment::Column::TaskId.eq(task_id))
            .order_by_asc(entity::attachment::Column::CreatedAt)
            .order_by_asc(entity::attachment::Column::Id)
            .all(self.db)
            .await?;

        Ok(entities.into_iter().map(Attachment::from_entity).collect())
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Attachment::delete_by_id(id)
            .exec(self.db)
            .await?;

        Ok(())
    }
}
