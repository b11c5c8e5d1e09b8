use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        personnel::{
            InvitePersonnelDto, PaginatedPersonnelDto, PersonnelDto, Role, UpdatePersonnelDto,
        },
    },
    server::{
        controller::PaginationParams,
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::personnel::{InvitePersonnelParams, UpdatePersonnelParams},
        service::{
            cleanup::CleanupService, magic_link::MagicLinkService, personnel::PersonnelService,
        },
        state::AppState,
    },
};

pub static PERSONNEL_TAG: &str = "personnel";

/// List the tenant's personnel.
///
/// # Access Control
/// - Any active member
///
/// # Arguments
/// - `params` - Pagination parameters (page and entries)
#[utoipa::path(
    get,
    path = "/api/personnel",
    tag = PERSONNEL_TAG,
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 0)"),
        ("entries" = Option<u64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Paginated personnel", body = PaginatedPersonnelDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_personnel(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let personnel = PersonnelService::new(&state.db, &state.realtime)
        .get_paginated(auth.tenant_id, params.page, params.entries)
        .await?;

    Ok((StatusCode::OK, Json(personnel.into_dto())))
}

/// Invite a user into the tenant.
///
/// Creates the user when the email is unknown, adds an inactive personnel record and
/// emails an invitation link that activates it.
///
/// # Access Control
/// - `Admin` and above; only an owner may invite another owner
///
/// # Returns
/// - `201 Created` - The inactive personnel record
/// - `400 Bad Request` - Blank name or email
/// - `403 Forbidden` - Caller may not grant the requested role
/// - `409 Conflict` - The user already has personnel in this tenant
#[utoipa::path(
    post,
    path = "/api/personnel",
    tag = PERSONNEL_TAG,
    request_body = InvitePersonnelDto,
    responses(
        (status = 201, description = "Invitation sent", body = PersonnelDto),
        (status = 400, description = "Invalid invitation data", body = ErrorDto),
        (status = 403, description = "Caller may not invite with this role", body = ErrorDto),
        (status = 409, description = "User is already personnel of the tenant", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn invite_personnel(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<InvitePersonnelDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Admin)])
        .await?;

    let links = MagicLinkService::new(&state.db, &state.delivery, &state.config);
    let personnel = PersonnelService::new(&state.db, &state.realtime)
        .invite(
            &auth.personnel,
            InvitePersonnelParams::from_dto(payload),
            &links,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(personnel.into_dto())))
}

/// Update a personnel record's role and title.
///
/// # Access Control
/// - `Admin` and above; only an owner may grant or revoke owner
///
/// # Returns
/// - `200 OK` - Updated record
/// - `404 Not Found` - No such personnel in the tenant
/// - `409 Conflict` - Would demote the last owner
#[utoipa::path(
    put,
    path = "/api/personnel/{id}",
    tag = PERSONNEL_TAG,
    params(
        ("id" = i32, Path, description = "Personnel ID")
    ),
    request_body = UpdatePersonnelDto,
    responses(
        (status = 200, description = "Personnel updated", body = PersonnelDto),
        (status = 403, description = "Caller may not change this role", body = ErrorDto),
        (status = 404, description = "Personnel not found", body = ErrorDto),
        (status = 409, description = "Would demote the last owner", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_personnel(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePersonnelDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Admin)])
        .await?;

    let personnel = PersonnelService::new(&state.db, &state.realtime)
        .update(&auth.personnel, id, UpdatePersonnelParams::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(personnel.into_dto())))
}

/// Remove a personnel record from the tenant.
///
/// Unassigns them from every task and work order and closes any open check-in.
///
/// # Access Control
/// - `Admin` and above; only an owner may remove an owner
///
/// # Returns
/// - `204 No Content` - Removed
/// - `404 Not Found` - No such personnel in the tenant
/// - `409 Conflict` - Would remove the last owner
#[utoipa::path(
    delete,
    path = "/api/personnel/{id}",
    tag = PERSONNEL_TAG,
    params(
        ("id" = i32, Path, description = "Personnel ID")
    ),
    responses(
        (status = 204, description = "Personnel removed"),
        (status = 403, description = "Caller may not remove this member", body = ErrorDto),
        (status = 404, description = "Personnel not found", body = ErrorDto),
        (status = 409, description = "Would remove the last owner", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_personnel(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Admin)])
        .await?;

    CleanupService::new(&state.db, &state.realtime, &state.config.upload_dir)
        .delete_personnel(&auth.personnel, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
