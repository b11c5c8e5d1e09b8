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
        api::ErrorDto,
        personnel::Role,
        status::{CreateStatusDto, ReorderStatusesDto, StatusDto, UpdateStatusDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::status::{CreateStatusParams, Status, UpdateStatusParams},
        service::status::StatusService,
        state::AppState,
    },
};

pub static STATUS_TAG: &str = "status";

#[derive(Deserialize)]
pub struct DeleteStatusParams {
    pub move_to: Option<i32>,
}

fn into_dtos(statuses: Vec<Status>) -> Vec<StatusDto> {
    statuses.into_iter().map(Status::into_dto).collect()
}

/// List the board columns ordered by position.
///
/// # Access Control
/// - Any active member
#[utoipa::path(
    get,
    path = "/api/statuses",
    tag = STATUS_TAG,
    responses(
        (status = 200, description = "Board columns", body = Vec<StatusDto>),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_statuses(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let statuses = StatusService::new(&state.db, &state.realtime)
        .get_all(auth.tenant_id)
        .await?;

    Ok((StatusCode::OK, Json(into_dtos(statuses))))
}

/// Append a new board column.
///
/// # Access Control
/// - `Manager` and above
#[utoipa::path(
    post,
    path = "/api/statuses",
    tag = STATUS_TAG,
    request_body = CreateStatusDto,
    responses(
        (status = 201, description = "Column created", body = StatusDto),
        (status = 400, description = "Blank column name", body = ErrorDto),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_status(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateStatusDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    let status = StatusService::new(&state.db, &state.realtime)
        .create(auth.tenant_id, CreateStatusParams::from_dto(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(status.into_dto())))
}

/// Update a column's name, color or completion flag.
///
/// Toggling `is_completed` sets or clears `completed_at` on every task in the column and
/// recomputes progress of the affected work orders.
///
/// # Access Control
/// - `Manager` and above
#[utoipa::path(
    put,
    path = "/api/statuses/{id}",
    tag = STATUS_TAG,
    params(
        ("id" = i32, Path, description = "Column ID")
    ),
    request_body = UpdateStatusDto,
    responses(
        (status = 200, description = "Column updated", body = StatusDto),
        (status = 400, description = "Blank column name", body = ErrorDto),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 404, description = "Column not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    let status = StatusService::new(&state.db, &state.realtime)
        .update(auth.tenant_id, id, UpdateStatusParams::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(status.into_dto())))
}

/// Reorder the board columns.
///
/// # Access Control
/// - `Manager` and above
///
/// # Returns
/// - `200 OK` - Columns in their new order
/// - `400 Bad Request` - `ids` is not a permutation of the tenant's columns
#[utoipa::path(
    put,
    path = "/api/statuses/order",
    tag = STATUS_TAG,
    request_body = ReorderStatusesDto,
    responses(
        (status = 200, description = "Columns reordered", body = Vec<StatusDto>),
        (status = 400, description = "Not a permutation of the column ids", body = ErrorDto),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn reorder_statuses(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<ReorderStatusesDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    let statuses = StatusService::new(&state.db, &state.realtime)
        .reorder(auth.tenant_id, &payload.ids)
        .await?;

    Ok((StatusCode::OK, Json(into_dtos(statuses))))
}

/// Delete a column, moving its tasks to `move_to` first.
///
/// # Access Control
/// - `Manager` and above
///
/// # Returns
/// - `204 No Content` - Column deleted
/// - `404 Not Found` - Column not in the tenant
/// - `409 Conflict` - Last column, or a non-empty column without a valid `move_to`
#[utoipa::path(
    delete,
    path = "/api/statuses/{id}",
    tag = STATUS_TAG,
    params(
        ("id" = i32, Path, description = "Column ID"),
        ("move_to" = Option<i32>, Query, description = "Column receiving the deleted column's tasks")
    ),
    responses(
        (status = 204, description = "Column deleted"),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 404, description = "Column not found", body = ErrorDto),
        (status = 409, description = "Column cannot be deleted", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Query(params): Query<DeleteStatusParams>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    StatusService::new(&state.db, &state.realtime)
        .delete(auth.tenant_id, id, params.move_to)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
