use chrono::{DateTime, Utc};

use crate::model::attachment::AttachmentDto;

#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub id: i32,
    pub tenant_id: i32,
    pub task_id: i32,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub uploaded_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    pub fn from_entity(entity: entity::attachment::Model) -> Self {
        Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            task_id: entity.task_id,
            file_name: entity.file_name,
            content_type: entity.content_type,
            size_bytes: entity.size_bytes,
            storage_key: entity.storage_key,
            uploaded_by: entity.uploaded_by,
            created_at: entity.created_at,
        }
    }

    pub fn into_dto(self) -> AttachmentDto {
        AttachmentDto {
            id: self.id,
            task_id: self.task_id,
            file_name: self.file_name,
            content_type: self.content_type,
            size_bytes: self.size_bytes,
            uploaded_by: self.uploaded_by,
            created_at: self.created_at,
        }
    }
}

/// Metadata for a file already written to disk.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub task_id: i32,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub uploaded_by: Option<i32>,
}
