use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        check_in::{CheckInDto, StartCheckInDto},
    },
    server::{
        error::AppError,
        middleware::auth::AuthGuard,
        model::check_in::{CheckIn, CheckInFilter, StartCheckInParams},
        service::check_in::CheckInService,
        state::AppState,
    },
};

pub static CHECK_IN_TAG: &str = "check_in";

#[derive(Deserialize)]
pub struct CheckInListParams {
    pub personnel_id: Option<i32>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Check in, optionally against a work order or task.
///
/// # Access Control
/// - Any active member, for themselves
///
/// # Returns
/// - `201 Created` - The open session
/// - `400 Bad Request` - Work order or task outside the tenant
/// - `409 Conflict` - The caller already has an open session
#[utoipa::path(
    post,
    path = "/api/check-ins",
    tag = CHECK_IN_TAG,
    request_body = StartCheckInDto,
    responses(
        (status = 201, description = "Checked in", body = CheckInDto),
        (status = 400, description = "Invalid work order or task", body = ErrorDto),
        (status = 409, description = "Already checked in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn start_check_in(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<StartCheckInDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let check_in = CheckInService::new(&state.db, &state.realtime)
        .start(&auth.personnel, StartCheckInParams::from_dto(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(check_in.into_dto())))
}

/// Keep an open session alive.
///
/// # Access Control
/// - The session's owner
#[utoipa::path(
    post,
    path = "/api/check-ins/{id}/heartbeat",
    tag = CHECK_IN_TAG,
    params(
        ("id" = i32, Path, description = "Check-in session ID")
    ),
    responses(
        (status = 200, description = "Heartbeat recorded", body = CheckInDto),
        (status = 403, description = "Not the session owner", body = ErrorDto),
        (status = 404, description = "Session not found", body = ErrorDto),
        (status = 409, description = "Session already closed", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn heartbeat_check_in(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let check_in = CheckInService::new(&state.db, &state.realtime)
        .heartbeat(&auth.personnel, id)
        .await?;

    Ok((StatusCode::OK, Json(check_in.into_dto())))
}

/// Close a session.
///
/// # Access Control
/// - The session's owner, or `Manager` and above
#[utoipa::path(
    post,
    path = "/api/check-ins/{id}/check-out",
    tag = CHECK_IN_TAG,
    params(
        ("id" = i32, Path, description = "Check-in session ID")
    ),
    responses(
        (status = 200, description = "Checked out", body = CheckInDto),
        (status = 403, description = "Not the owner or a manager", body = ErrorDto),
        (status = 404, description = "Session not found", body = ErrorDto),
        (status = 409, description = "Session already closed", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn check_out(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let check_in = CheckInService::new(&state.db, &state.realtime)
        .check_out(&auth.personnel, id)
        .await?;

    Ok((StatusCode::OK, Json(check_in.into_dto())))
}

/// Get the caller's open session, or `null`.
#[utoipa::path(
    get,
    path = "/api/check-ins/active",
    tag = CHECK_IN_TAG,
    responses(
        (status = 200, description = "Open session or null", body = Option<CheckInDto>),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_active_check_in(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let check_in = CheckInService::new(&state.db, &state.realtime)
        .active(&auth.personnel)
        .await?;

    Ok((StatusCode::OK, Json(check_in.map(CheckIn::into_dto))))
}

/// List check-in sessions.
///
/// # Access Control
/// - Managers and above see everyone's sessions; others only their own
#[utoipa::path(
    get,
    path = "/api/check-ins",
    tag = CHECK_IN_TAG,
    params(
        ("personnel_id" = Option<i32>, Query, description = "Only this personnel's sessions"),
        ("from" = Option<DateTime<Utc>>, Query, description = "Sessions started at or after"),
        ("to" = Option<DateTime<Utc>>, Query, description = "Sessions started before")
    ),
    responses(
        (status = 200, description = "Check-in sessions", body = Vec<CheckInDto>),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_check_ins(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CheckInListParams>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let filter = CheckInFilter {
        personnel_id: params.personnel_id,
        from: params.from,
        to: params.to,
    };

    let check_ins = CheckInService::new(&state.db, &state.realtime)
        .list(&auth.personnel, filter)
        .await?;

    let check_ins_dto: Vec<CheckInDto> = check_ins.into_iter().map(CheckIn::into_dto).collect();

    Ok((StatusCode::OK, Json(check_ins_dto)))
}
