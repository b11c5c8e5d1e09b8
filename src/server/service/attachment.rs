//! Task attachments stored on the local filesystem.
//!
//! Files live under `<upload_dir>/<tenant_id>/<uuid>`; the relative part is the
//! attachment's storage key. Uploads are streamed to disk chunk by chunk and abandoned as
//! soon as they pass the size limit.

use std::path::{Path, PathBuf};

use axum::extract::{multipart::Field, Multipart};
use sea_orm::DatabaseConnection;
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::server::{
    data::{attachment::AttachmentRepository, timeline::TimelineRepository},
    error::AppError,
    model::{
        attachment::{Attachment, NewAttachment},
        personnel::Personnel,
        task::TimelineKind,
    },
    realtime::{RealtimeHub, Room},
};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Absolute location of a stored file.
pub fn file_path(upload_dir: &Path, storage_key: &str) -> PathBuf {
    upload_dir.join(storage_key)
}

/// Strips any directory components a client put in the file name.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(name).trim();
    if base.is_empty() {
        "upload".to_string()
    } else {
        base.to_string()
    }
}

/// Removes a stored file. A file that is already gone is not an error.
pub async fn remove_file(upload_dir: &Path, storage_key: &str) -> Result<(), AppError> {
    match fs::remove_file(file_path(upload_dir, storage_key)).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

pub struct AttachmentService<'a> {
    db: &'a DatabaseConnection,
    realtime: &'a RealtimeHub,
    upload_dir: &'a Path,
    max_upload_bytes: usize,
}

impl<'a> AttachmentService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        realtime: &'a RealtimeHub,
        upload_dir: &'a Path,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            db,
            realtime,
            upload_dir,
            max_upload_bytes,
        }
    }

    /// Stores every file field of a multipart body as an attachment of `task_id`.
    ///
    /// Non-file fields are ignored. Files already stored stay stored when a later one
    /// fails.
    ///
    /// # Returns
    /// - `Ok(Vec<Attachment>)` - Stored attachments in upload order
    /// - `Err(AppError::BadRequest)` - No file fields, or a file exceeds the size limit
    /// - `Err(AppError::MultipartErr)` - Malformed body
    /// - `Err(AppError::IoErr)` - Writing to disk failed
    pub async fn upload(
        &self,
        actor: &Personnel,
        task_id: i32,
        mut multipart: Multipart,
    ) -> Result<Vec<Attachment>, AppError> {
        let tenant_id = actor.tenant_id;
        let repo = AttachmentRepository::new(self.db);
        let mut stored = Vec::new();

        while let Some(mut field) = multipart.next_field().await? {
            let Some(file_name) = field.file_name().map(sanitize_file_name) else {
                continue;
            };
            let content_type = field
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string();

            let storage_key = format!("{}/{}", tenant_id, Uuid::new_v4());
            let new_attachment = NewAttachment {
                task_id,
                file_name,
                content_type,
                size_bytes: 0,
                storage_key: storage_key.clone(),
                uploaded_by: Some(actor.id),
            };

            let stored_file = self
                .store(&repo, tenant_id, &mut field, new_attachment)
                .await;
            let attachment = match stored_file {
                Ok(attachment) => attachment,
                Err(e) => {
                    if let Err(remove_err) = remove_file(self.upload_dir, &storage_key).await {
                        tracing::error!(
                            storage_key = %storage_key,
                            "Failed to remove partial upload: {}",
                            remove_err
                        );
                    }
                    return Err(e);
                }
            };
            let size = attachment.size_bytes;

            if let Err(e) = TimelineRepository::new(self.db)
                .create(
                    tenant_id,
                    task_id,
                    Some(actor.id),
                    TimelineKind::Attachment,
                    format!("Attached {}", attachment.file_name),
                )
                .await
            {
                tracing::error!(task_id, "Failed to log attachment: {}", e);
            }

            tracing::debug!(tenant_id, task_id, size, "Stored attachment");
            self.realtime.publish(
                tenant_id,
                Room::Task(task_id),
                "attachment.created",
                &attachment.clone().into_dto(),
            );
            stored.push(attachment);
        }

        if stored.is_empty() {
            return Err(AppError::BadRequest("No file was uploaded".to_string()));
        }

        Ok(stored)
    }

    /// Streams one multipart field to disk and records its metadata.
    ///
    /// The caller removes the file when this fails.
    async fn store(
        &self,
        repo: &AttachmentRepository<'_>,
        tenant_id: i32,
        field: &mut Field<'_>,
        mut attachment: NewAttachment,
    ) -> Result<Attachment, AppError> {
        let path = file_path(self.upload_dir, &attachment.storage_key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await?;
        let mut size = 0usize;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len();
            if size > self.max_upload_bytes {
                return Err(AppError::BadRequest(format!(
                    "File \"{}\" exceeds the {} byte upload limit",
                    attachment.file_name, self.max_upload_bytes
                )));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        attachment.size_bytes = size as i64;
        Ok(repo.create(tenant_id, attachment).await?)
    }

    pub async fn get_by_task(&self, task_id: i32) -> Result<Vec<Attachment>, AppError> {
        Ok(AttachmentRepository::new(self.db).get_by_task(task_id).await?)
    }

    /// Looks up attachment metadata in the tenant.
    pub async fn get(&self, tenant_id: i32, id: i32) -> Result<Attachment, AppError> {
        AttachmentRepository::new(self.db)
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attachment not found".to_string()))
    }

    /// Opens the stored file for streaming.
    ///
    /// # Returns
    /// - `Ok(File)` - Open file handle
    /// - `Err(AppError::NotFound)` - Metadata exists but the file is gone
    pub async fn open(&self, attachment: &Attachment) -> Result<fs::File, AppError> {
        match fs::File::open(file_path(self.upload_dir, &attachment.storage_key)).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(attachment_id = attachment.id, "Attachment file missing");
                Err(AppError::NotFound("Attachment file not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes the file and its metadata.
    pub async fn delete(&self, attachment: &Attachment) -> Result<(), AppError> {
        remove_file(self.upload_dir, &attachment.storage_key).await?;
        AttachmentRepository::new(self.db)
            .delete(attachment.id)
            .await?;

        self.realtime.publish(
            attachment.tenant_id,
            Room::Task(attachment.task_id),
            "attachment.deleted",
            &serde_json::json!({ "id": attachment.id }),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::FromRequest, http::Request};
    use test_utils::{builder::TestBuilder, factory};

    use crate::server::data::personnel::PersonnelRepository;

    const BOUNDARY: &str = "fieldops-test-boundary";

    fn multipart(files: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, content) in files {
            body.push_str(&format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{n}\"\r\n\
                 Content-Type: text/plain\r\n\r\n{c}\r\n",
                b = BOUNDARY,
                n = name,
                c = content
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn strips_directories_from_file_names() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\site.jpg"), "site.jpg");
        assert_eq!(sanitize_file_name("  "), "upload");
    }

    /// Tests storing an upload, reading it back and deleting it.
    ///
    /// Expected: file written under the tenant directory, removed on delete
    #[tokio::test]
    async fn stores_reads_and_deletes_file() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();
        let upload_dir = std::env::temp_dir().join(format!("fieldops-{}", Uuid::new_v4()));

        let member = factory::create_member(db).await?;
        let actor = PersonnelRepository::new(db)
            .find_by_id(member.tenant.id, member.personnel.id)
            .await?
            .unwrap();
        let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
        let task = factory::create_task(db, member.tenant.id, todo.id).await?;

        let service = AttachmentService::new(db, &realtime, &upload_dir, 1024);
        let body = Multipart::from_request(multipart(&[("notes.txt", "pipe is leaking")]), &())
            .await
            .unwrap();
        let stored = service.upload(&actor, task.id, body).await?;

        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].file_name, "notes.txt");
        assert_eq!(stored[0].size_bytes, 15);
        assert!(stored[0]
            .storage_key
            .starts_with(&format!("{}/", member.tenant.id)));

        let path = file_path(&upload_dir, &stored[0].storage_key);
        assert_eq!(fs::read_to_string(&path).await?, "pipe is leaking");

        service.delete(&stored[0]).await?;
        assert!(!path.exists());
        assert!(service.get_by_task(task.id).await?.is_empty());

        let _ = fs::remove_dir_all(&upload_dir).await;
        Ok(())
    }

    /// Tests that an oversized file is rejected and nothing is kept.
    ///
    /// Expected: Err(AppError::BadRequest) and no metadata
    #[tokio::test]
    async fn rejects_oversized_file() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();
        let upload_dir = std::env::temp_dir().join(format!("fieldops-{}", Uuid::new_v4()));

        let member = factory::create_member(db).await?;
        let actor = PersonnelRepository::new(db)
            .find_by_id(member.tenant.id, member.personnel.id)
            .await?
            .unwrap();
        let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
        let task = factory::create_task(db, member.tenant.id, todo.id).await?;

        let service = AttachmentService::new(db, &realtime, &upload_dir, 4);
        let body = Multipart::from_request(multipart(&[("big.txt", "too large")]), &())
            .await
            .unwrap();
        let result = service.upload(&actor, task.id, body).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(service.get_by_task(task.id).await?.is_empty());

        let _ = fs::remove_dir_all(&upload_dir).await;
        Ok(())
    }

    /// Tests an upload whose metadata insert fails after the file was written.
    ///
    /// Expected: the error is returned and the written file is removed
    #[tokio::test]
    async fn removes_file_when_insert_fails() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();
        let upload_dir = std::env::temp_dir().join(format!("fieldops-{}", Uuid::new_v4()));

        let member = factory::create_member(db).await?;
        let actor = PersonnelRepository::new(db)
            .find_by_id(member.tenant.id, member.personnel.id)
            .await?
            .unwrap();

        let service = AttachmentService::new(db, &realtime, &upload_dir, 1024);
        let body = Multipart::from_request(multipart(&[("notes.txt", "orphan")]), &())
            .await
            .unwrap();
        let result = service.upload(&actor, 999_999, body).await;

        assert!(matches!(result, Err(AppError::DbErr(_))));
        let tenant_dir = upload_dir.join(member.tenant.id.to_string());
        let mut entries = fs::read_dir(&tenant_dir).await?;
        assert!(entries.next_entry().await?.is_none());

        let _ = fs::remove_dir_all(&upload_dir).await;
        Ok(())
    }
}
