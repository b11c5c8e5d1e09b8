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
        task::TaskDto,
        work_order::{
            CreateWorkOrderDto, PaginatedWorkOrdersDto, SetWorkOrderPersonnelDto,
            UpdateWorkOrderDto, WorkOrderDto, WorkOrderStatus,
        },
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::work_order::{CreateWorkOrderParams, UpdateWorkOrderParams, WorkOrderFilter},
        service::{cleanup::CleanupService, work_order::WorkOrderService},
        state::AppState,
    },
};

pub static WORK_ORDER_TAG: &str = "work_order";

#[derive(Deserialize)]
pub struct WorkOrderListParams {
    pub status: Option<WorkOrderStatus>,
    pub client_id: Option<i32>,
    pub search: Option<String>,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "super::default_entries")]
    pub entries: u64,
}

/// Get a filtered, paginated list of work orders.
///
/// # Access Control
/// - Any active member; technicians only see work orders they are assigned to
#[utoipa::path(
    get,
    path = "/api/work-orders",
    tag = WORK_ORDER_TAG,
    params(
        ("status" = Option<WorkOrderStatus>, Query, description = "Only work orders in this status"),
        ("client_id" = Option<i32>, Query, description = "Only work orders of this client"),
        ("search" = Option<String>, Query, description = "Case-insensitive title substring"),
        ("page" = Option<u64>, Query, description = "Page number (default: 0)"),
        ("entries" = Option<u64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Paginated work orders", body = PaginatedWorkOrdersDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_work_orders(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<WorkOrderListParams>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let filter = WorkOrderFilter {
        status: params.status,
        client_id: params.client_id,
        search: params.search,
    };

    let work_orders = WorkOrderService::new(&state.db, &state.realtime)
        .get_paginated(
            auth.tenant_id,
            &filter,
            auth.viewer(),
            params.page,
            params.entries,
        )
        .await?;

    Ok((StatusCode::OK, Json(work_orders.into_dto())))
}

/// Create a work order, optionally assigning personnel.
///
/// # Access Control
/// - `Manager` and above
///
/// # Returns
/// - `201 Created` - The new work order
/// - `400 Bad Request` - Blank title, or a client or personnel outside the tenant
#[utoipa::path(
    post,
    path = "/api/work-orders",
    tag = WORK_ORDER_TAG,
    request_body = CreateWorkOrderDto,
    responses(
        (status = 201, description = "Work order created", body = WorkOrderDto),
        (status = 400, description = "Invalid work order data", body = ErrorDto),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_work_order(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateWorkOrderDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    let work_order = WorkOrderService::new(&state.db, &state.realtime)
        .create(&auth.personnel, CreateWorkOrderParams::from_dto(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(work_order.into_dto())))
}

/// Get a work order with its progress and personnel.
///
/// # Access Control
/// - Manager+ or personnel assigned to the work order
#[utoipa::path(
    get,
    path = "/api/work-orders/{id}",
    tag = WORK_ORDER_TAG,
    params(
        ("id" = i32, Path, description = "Work order ID")
    ),
    responses(
        (status = 200, description = "Work order", body = WorkOrderDto),
        (status = 403, description = "Caller may not view this work order", body = ErrorDto),
        (status = 404, description = "Work order not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_work_order(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::WorkOrderView(id)])
        .await?;

    let work_order = WorkOrderService::new(&state.db, &state.realtime)
        .get(auth.tenant_id, id)
        .await?;

    Ok((StatusCode::OK, Json(work_order.into_dto())))
}

/// Partially update a work order.
///
/// # Access Control
/// - `Manager` and above
#[utoipa::path(
    put,
    path = "/api/work-orders/{id}",
    tag = WORK_ORDER_TAG,
    params(
        ("id" = i32, Path, description = "Work order ID")
    ),
    request_body = UpdateWorkOrderDto,
    responses(
        (status = 200, description = "Work order updated", body = WorkOrderDto),
        (status = 400, description = "Invalid work order data", body = ErrorDto),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 404, description = "Work order not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_work_order(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateWorkOrderDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    let work_order = WorkOrderService::new(&state.db, &state.realtime)
        .update(auth.tenant_id, id, UpdateWorkOrderParams::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(work_order.into_dto())))
}

/// Delete a work order together with its tasks.
///
/// # Access Control
/// - `Manager` and above
#[utoipa::path(
    delete,
    path = "/api/work-orders/{id}",
    tag = WORK_ORDER_TAG,
    params(
        ("id" = i32, Path, description = "Work order ID")
    ),
    responses(
        (status = 204, description = "Work order deleted"),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 404, description = "Work order not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_work_order(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    CleanupService::new(&state.db, &state.realtime, &state.config.upload_dir)
        .delete_work_order(auth.tenant_id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Replace a work order's personnel and propagate the change to its tasks.
///
/// Added personnel become assignees of every linked task and receive one notification;
/// removed personnel are unassigned from the linked tasks.
///
/// # Access Control
/// - `Manager` and above
#[utoipa::path(
    put,
    path = "/api/work-orders/{id}/personnel",
    tag = WORK_ORDER_TAG,
    params(
        ("id" = i32, Path, description = "Work order ID")
    ),
    request_body = SetWorkOrderPersonnelDto,
    responses(
        (status = 200, description = "Personnel replaced", body = WorkOrderDto),
        (status = 400, description = "Personnel outside the tenant", body = ErrorDto),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 404, description = "Work order not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn set_work_order_personnel(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<SetWorkOrderPersonnelDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    let work_order = WorkOrderService::new(&state.db, &state.realtime)
        .set_personnel(&auth.personnel, id, &payload.personnel_ids)
        .await?;

    Ok((StatusCode::OK, Json(work_order.into_dto())))
}

/// List the tasks linked to a work order.
///
/// # Access Control
/// - Manager+ or personnel assigned to the work order
#[utoipa::path(
    get,
    path = "/api/work-orders/{id}/tasks",
    tag = WORK_ORDER_TAG,
    params(
        ("id" = i32, Path, description = "Work order ID")
    ),
    responses(
        (status = 200, description = "Linked tasks", body = Vec<TaskDto>),
        (status = 403, description = "Caller may not view this work order", body = ErrorDto),
        (status = 404, description = "Work order not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_work_order_tasks(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::WorkOrderView(id)])
        .await?;

    let tasks = WorkOrderService::new(&state.db, &state.realtime)
        .get_tasks(auth.tenant_id, id)
        .await?;

    let tasks_dto: Vec<TaskDto> = tasks.into_iter().map(|t| t.into_dto()).collect();

    Ok((StatusCode::OK, Json(tasks_dto)))
}
