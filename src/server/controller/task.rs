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
        quick_add::{QuickAddResultDto, QuickAddTextDto, TaskDraftDto},
        task::{
            BoardDto, CreateCommentDto, CreateTaskDto, MoveTaskDto, PaginatedTasksDto,
            SetAssigneesDto, TaskDto, TimelineEntryDto, UpdateTaskDto,
        },
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::task::{board_into_dto, CreateTaskParams, TaskFilter, UpdateTaskParams},
        service::{cleanup::CleanupService, quick_add::QuickAddService, task::TaskService},
        state::AppState,
    },
};

pub static TASK_TAG: &str = "task";

#[derive(Deserialize)]
pub struct BoardParams {
    pub work_order_id: Option<i32>,
    pub assignee_id: Option<i32>,
    pub client_id: Option<i32>,
}

#[derive(Deserialize)]
pub struct TaskListParams {
    pub work_order_id: Option<i32>,
    pub assignee_id: Option<i32>,
    pub client_id: Option<i32>,
    pub search: Option<String>,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "super::default_entries")]
    pub entries: u64,
}

/// Get the kanban board: every column with the tasks visible to the caller.
///
/// # Access Control
/// - Any active member; technicians only see tasks they are assigned to directly or
///   through the task's work order
#[utoipa::path(
    get,
    path = "/api/board",
    tag = TASK_TAG,
    params(
        ("work_order_id" = Option<i32>, Query, description = "Only tasks of this work order"),
        ("assignee_id" = Option<i32>, Query, description = "Only tasks assigned to this personnel"),
        ("client_id" = Option<i32>, Query, description = "Only tasks of this client")
    ),
    responses(
        (status = 200, description = "Board columns with tasks", body = BoardDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_board(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<BoardParams>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let filter = TaskFilter {
        work_order_id: params.work_order_id,
        assignee_id: params.assignee_id,
        client_id: params.client_id,
        search: None,
    };

    let columns = TaskService::new(&state.db, &state.realtime)
        .get_board(auth.tenant_id, &filter, auth.viewer())
        .await?;

    Ok((StatusCode::OK, Json(board_into_dto(columns))))
}

/// Get a filtered, paginated list of visible tasks.
///
/// # Access Control
/// - Any active member; visibility as for the board
#[utoipa::path(
    get,
    path = "/api/tasks",
    tag = TASK_TAG,
    params(
        ("work_order_id" = Option<i32>, Query, description = "Only tasks of this work order"),
        ("assignee_id" = Option<i32>, Query, description = "Only tasks assigned to this personnel"),
        ("client_id" = Option<i32>, Query, description = "Only tasks of this client"),
        ("search" = Option<String>, Query, description = "Case-insensitive title substring"),
        ("page" = Option<u64>, Query, description = "Page number (default: 0)"),
        ("entries" = Option<u64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Paginated tasks", body = PaginatedTasksDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_tasks(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<TaskListParams>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let filter = TaskFilter {
        work_order_id: params.work_order_id,
        assignee_id: params.assignee_id,
        client_id: params.client_id,
        search: params.search,
    };

    let tasks = TaskService::new(&state.db, &state.realtime)
        .get_paginated(
            auth.tenant_id,
            &filter,
            auth.viewer(),
            params.page,
            params.entries,
        )
        .await?;

    Ok((StatusCode::OK, Json(tasks.into_dto())))
}

/// Create a task.
///
/// The task is appended to `column_id`, or to the first column when omitted. Assignees
/// are notified and the linked work order's progress is recomputed.
///
/// # Access Control
/// - `Manager` and above
///
/// # Returns
/// - `201 Created` - The new task
/// - `400 Bad Request` - Blank title, or a work order, client or assignee outside the tenant
/// - `409 Conflict` - The tenant has no columns
#[utoipa::path(
    post,
    path = "/api/tasks",
    tag = TASK_TAG,
    request_body = CreateTaskDto,
    responses(
        (status = 201, description = "Task created", body = TaskDto),
        (status = 400, description = "Invalid task data", body = ErrorDto),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 409, description = "No board columns exist", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_task(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateTaskDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    let task = TaskService::new(&state.db, &state.realtime)
        .create(&auth.personnel, CreateTaskParams::from_dto(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(task.into_dto())))
}

/// Get a task with its assignees.
///
/// # Access Control
/// - Manager+, an assignee, or personnel of the task's work order
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    tag = TASK_TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task", body = TaskDto),
        (status = 403, description = "Caller may not view this task", body = ErrorDto),
        (status = 404, description = "Task not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_task(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::TaskAccess(id)])
        .await?;

    let task = TaskService::new(&state.db, &state.realtime)
        .get(auth.tenant_id, id)
        .await?;

    Ok((StatusCode::OK, Json(task.into_dto())))
}

/// Partially update a task.
///
/// Absent fields are kept; nullable fields sent as `null` are cleared.
///
/// # Access Control
/// - Manager+, an assignee, or personnel of the task's work order
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    tag = TASK_TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    request_body = UpdateTaskDto,
    responses(
        (status = 200, description = "Task updated", body = TaskDto),
        (status = 400, description = "Invalid task data", body = ErrorDto),
        (status = 403, description = "Caller may not edit this task", body = ErrorDto),
        (status = 404, description = "Task not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_task(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTaskDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::TaskAccess(id)])
        .await?;

    let task = TaskService::new(&state.db, &state.realtime)
        .update(&auth.personnel, id, UpdateTaskParams::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(task.into_dto())))
}

/// Delete a task with its assignees, timeline and attachments.
///
/// # Access Control
/// - `Manager` and above
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    tag = TASK_TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 404, description = "Task not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_task(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[
            Permission::MinRole(Role::Manager),
            Permission::TaskAccess(id),
        ])
        .await?;

    CleanupService::new(&state.db, &state.realtime, &state.config.upload_dir)
        .delete_task(auth.tenant_id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Move a task to a column and position on the board.
///
/// # Access Control
/// - Manager+, an assignee, or personnel of the task's work order
///
/// # Returns
/// - `200 OK` - The moved task
/// - `400 Bad Request` - Target column not in the tenant
/// - `404 Not Found` - Task not found
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/move",
    tag = TASK_TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    request_body = MoveTaskDto,
    responses(
        (status = 200, description = "Task moved", body = TaskDto),
        (status = 400, description = "Invalid target column", body = ErrorDto),
        (status = 403, description = "Caller may not edit this task", body = ErrorDto),
        (status = 404, description = "Task not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn move_task(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<MoveTaskDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::TaskAccess(id)])
        .await?;

    let task = TaskService::new(&state.db, &state.realtime)
        .move_task(&auth.personnel, id, payload.column_id, payload.position)
        .await?;

    Ok((StatusCode::OK, Json(task.into_dto())))
}

/// Replace a task's assignees.
///
/// # Access Control
/// - Manager+, an assignee, or personnel of the task's work order
#[utoipa::path(
    put,
    path = "/api/tasks/{id}/assignees",
    tag = TASK_TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    request_body = SetAssigneesDto,
    responses(
        (status = 200, description = "Assignees replaced", body = TaskDto),
        (status = 400, description = "Personnel outside the tenant", body = ErrorDto),
        (status = 403, description = "Caller may not edit this task", body = ErrorDto),
        (status = 404, description = "Task not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn set_task_assignees(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<SetAssigneesDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::TaskAccess(id)])
        .await?;

    let task = TaskService::new(&state.db, &state.realtime)
        .set_assignees(&auth.personnel, id, &payload.personnel_ids)
        .await?;

    Ok((StatusCode::OK, Json(task.into_dto())))
}

/// Get a task's timeline, newest first.
///
/// # Access Control
/// - Manager+, an assignee, or personnel of the task's work order
#[utoipa::path(
    get,
    path = "/api/tasks/{id}/timeline",
    tag = TASK_TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Timeline entries", body = Vec<TimelineEntryDto>),
        (status = 403, description = "Caller may not view this task", body = ErrorDto),
        (status = 404, description = "Task not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_task_timeline(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::TaskAccess(id)])
        .await?;

    let entries = TaskService::new(&state.db, &state.realtime)
        .get_timeline(id)
        .await?;

    let entries_dto: Vec<TimelineEntryDto> = entries.into_iter().map(|e| e.into_dto()).collect();

    Ok((StatusCode::OK, Json(entries_dto)))
}

/// Comment on a task.
///
/// # Access Control
/// - Manager+, an assignee, or personnel of the task's work order
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/comments",
    tag = TASK_TAG,
    params(
        ("id" = i32, Path, description = "Task ID")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment added", body = TimelineEntryDto),
        (status = 400, description = "Blank comment", body = ErrorDto),
        (status = 403, description = "Caller may not view this task", body = ErrorDto),
        (status = 404, description = "Task not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn comment_on_task(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<CreateCommentDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::TaskAccess(id)])
        .await?;

    let entry = TaskService::new(&state.db, &state.realtime)
        .comment(&auth.personnel, id, &payload.message)
        .await?;

    Ok((StatusCode::CREATED, Json(entry.into_dto())))
}

/// Parse free text into a task draft without creating anything.
///
/// # Access Control
/// - Any active member
///
/// # Returns
/// - `200 OK` - Parsed draft with names resolved against the tenant
/// - `400 Bad Request` - Blank text
#[utoipa::path(
    post,
    path = "/api/tasks/parse",
    tag = TASK_TAG,
    request_body = QuickAddTextDto,
    responses(
        (status = 200, description = "Parsed draft", body = TaskDraftDto),
        (status = 400, description = "Blank text", body = ErrorDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn parse_task(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<QuickAddTextDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let draft = QuickAddService::new(&state.db, &state.realtime)
        .parse(auth.tenant_id, &payload.text)
        .await?;

    Ok((StatusCode::OK, Json(draft.into_dto())))
}

/// Parse free text and create the task it describes.
///
/// # Access Control
/// - `Manager` and above
///
/// # Returns
/// - `201 Created` - The created task and the draft it came from
/// - `400 Bad Request` - Blank text or the text does not ask to create a task
#[utoipa::path(
    post,
    path = "/api/tasks/quick-add",
    tag = TASK_TAG,
    request_body = QuickAddTextDto,
    responses(
        (status = 201, description = "Task created from text", body = QuickAddResultDto),
        (status = 400, description = "Text does not describe a new task", body = ErrorDto),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn quick_add_task(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<QuickAddTextDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    let (task, draft) = QuickAddService::new(&state.db, &state.realtime)
        .create(&auth.personnel, &payload.text)
        .await?;

    let result = QuickAddResultDto {
        task: task.into_dto(),
        draft: draft.into_dto(),
    };

    Ok((StatusCode::CREATED, Json(result)))
}
