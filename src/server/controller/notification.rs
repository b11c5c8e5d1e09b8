use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    model::{
        api::{CountDto, ErrorDto},
        notification::NotificationListDto,
    },
    server::{
        error::AppError, middleware::auth::AuthGuard,
        service::notification::NotificationService, state::AppState,
    },
};

pub static NOTIFICATION_TAG: &str = "notification";

#[derive(Deserialize)]
pub struct NotificationListParams {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "super::default_entries")]
    pub entries: u64,
}

/// Get the caller's notifications, newest first, with the unread count.
///
/// # Access Control
/// - Any active member; only their own notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = NOTIFICATION_TAG,
    params(
        ("unread_only" = Option<bool>, Query, description = "Only unread notifications (default: false)"),
        ("page" = Option<u64>, Query, description = "Page number (default: 0)"),
        ("entries" = Option<u64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Notifications", body = NotificationListDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_notifications(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<NotificationListParams>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let notifications = NotificationService::new(&state.db, &state.realtime)
        .get_paginated(
            auth.tenant_id,
            auth.user.id,
            params.unread_only,
            params.page,
            params.entries,
        )
        .await?;

    Ok((StatusCode::OK, Json(notifications.into_dto())))
}

/// Mark one notification as read.
///
/// # Access Control
/// - The notification's recipient
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    tag = NOTIFICATION_TAG,
    params(
        ("id" = i32, Path, description = "Notification ID")
    ),
    responses(
        (status = 204, description = "Marked read"),
        (status = 404, description = "Notification not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    NotificationService::new(&state.db, &state.realtime)
        .mark_read(auth.tenant_id, auth.user.id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Mark every unread notification of the caller as read.
#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    tag = NOTIFICATION_TAG,
    responses(
        (status = 200, description = "Number of notifications marked read", body = CountDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let count = NotificationService::new(&state.db, &state.realtime)
        .mark_all_read(auth.tenant_id, auth.user.id)
        .await?;

    Ok((StatusCode::OK, Json(CountDto { count })))
}
