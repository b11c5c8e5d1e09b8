use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tokio_util::io::ReaderStream;
use tower_sessions::Session;

use crate::{
    model::{api::ErrorDto, attachment::AttachmentDto},
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::attachment::Attachment,
        service::attachment::AttachmentService,
        state::AppState,
    },
};

pub static ATTACHMENT_TAG: &str = "attachment";

fn service(state: &AppState) -> AttachmentService<'_> {
    AttachmentService::new(
        &state.db,
        &state.realtime,
        &state.config.upload_dir,
        state.config.max_upload_bytes,
    )
}

/// Upload one or more files to a task.
///
/// Every multipart field with a file name is stored; other fields are ignored.
///
/// # Access Control
/// - Manager+, an assignee, or personnel of the task's work order
///
/// # Returns
/// - `201 Created` - Stored attachments
/// - `400 Bad Request` - No file, or a file over the upload limit
/// - `404 Not Found` - Task not found
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/attachments",
    tag = ATTACHMENT_TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    request_body(content_type = "multipart/form-data", description = "Files to attach"),
    responses(
        (status = 201, description = "Files stored", body = Vec<AttachmentDto>),
        (status = 400, description = "Missing or oversized file", body = ErrorDto),
        (status = 403, description = "Caller may not edit this task", body = ErrorDto),
        (status = 404, description = "Task not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn upload_attachments(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::TaskAccess(id)])
        .await?;

    let attachments = service(&state)
        .upload(&auth.personnel, id, multipart)
        .await?;

    let attachments_dto: Vec<AttachmentDto> =
        attachments.into_iter().map(Attachment::into_dto).collect();

    Ok((StatusCode::CREATED, Json(attachments_dto)))
}

/// List a task's attachments.
///
/// # Access Control
/// - Manager+, an assignee, or personnel of the task's work order
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/attachments",
    tag = ATTACHMENT_TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Attachments", body = Vec<AttachmentDto>),
        (status = 403, description = "Caller may not view this task", body = ErrorDto),
        (status = 404, description = "Task not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_task_attachments(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::TaskAccess(id)])
        .await?;

    let attachments = service(&state).get_by_task(id).await?;

    let attachments_dto: Vec<AttachmentDto> =
        attachments.into_iter().map(Attachment::into_dto).collect();

    Ok((StatusCode::OK, Json(attachments_dto)))
}

/// Download an attachment.
///
/// Streams the stored file with its recorded content type and a `Content-Disposition`
/// header carrying the original file name.
///
/// # Access Control
/// - Manager+, an assignee, or personnel of the attachment's task
#[utoipa::path(
    get,
    path = "/api/attachments/{id}",
    tag = ATTACHMENT_TAG,
    params(
        ("id" = i32, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 403, description = "Caller may not view the task", body = ErrorDto),
        (status = 404, description = "Attachment or file not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn download_attachment(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let guard = AuthGuard::new(&state.db, &session);
    let auth = guard.require(&[]).await?;

    let service = service(&state);
    let attachment = service.get(auth.tenant_id, id).await?;
    let _ = guard
        .require(&[Permission::TaskAccess(attachment.task_id)])
        .await?;

    let file = service.open(&attachment).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    let headers = [
        (header::CONTENT_TYPE, attachment.content_type),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}\"",
                attachment.file_name.replace('"', "'")
            ),
        ),
    ];

    Ok((StatusCode::OK, headers, body))
}

/// Delete an attachment and its stored file.
///
/// # Access Control
/// - Manager+, an assignee, or personnel of the attachment's task
#[utoipa::path(
    delete,
    path = "/api/attachments/{id}",
    tag = ATTACHMENT_TAG,
    params(
        ("id" = i32, Path, description = "Attachment ID")
    ),
    responses(
        (status = 204, description = "Attachment deleted"),
        (status = 403, description = "Caller may not edit the task", body = ErrorDto),
        (status = 404, description = "Attachment not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_attachment(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let guard = AuthGuard::new(&state.db, &session);
    let auth = guard.require(&[]).await?;

    let service = service(&state);
    let attachment = service.get(auth.tenant_id, id).await?;
    let _ = guard
        .require(&[Permission::TaskAccess(attachment.task_id)])
        .await?;

    service.delete(&attachment).await?;

    Ok(StatusCode::NO_CONTENT)
}
