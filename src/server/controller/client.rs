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
        client::{ClientDto, ClientInputDto, PaginatedClientsDto},
        personnel::Role,
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::client::ClientParams,
        service::{cleanup::CleanupService, client::ClientService},
        state::AppState,
    },
};

pub static CLIENT_TAG: &str = "client";

#[derive(Deserialize)]
pub struct ClientListParams {
    pub search: Option<String>,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "super::default_entries")]
    pub entries: u64,
}

/// List clients ordered by name.
///
/// # Access Control
/// - Any active member
///
/// # Arguments
/// - `params` - Optional name search plus page and entries
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = CLIENT_TAG,
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("page" = Option<u64>, Query, description = "Page number (default: 0)"),
        ("entries" = Option<u64>, Query, description = "Items per page (default: 10)")
    ),
    responses(
        (status = 200, description = "Paginated clients", body = PaginatedClientsDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_clients(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ClientListParams>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let clients = ClientService::new(&state.db)
        .get_paginated(
            auth.tenant_id,
            params.search.as_deref(),
            params.page,
            params.entries,
        )
        .await?;

    Ok((StatusCode::OK, Json(clients.into_dto())))
}

/// Create a client.
///
/// # Access Control
/// - `Manager` and above
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = CLIENT_TAG,
    request_body = ClientInputDto,
    responses(
        (status = 201, description = "Client created", body = ClientDto),
        (status = 400, description = "Blank client name", body = ErrorDto),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_client(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<ClientInputDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    let client = ClientService::new(&state.db)
        .create(auth.tenant_id, ClientParams::from_dto(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(client.into_dto())))
}

/// Get a client by ID.
///
/// # Access Control
/// - Any active member
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = CLIENT_TAG,
    params(
        ("id" = i32, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client", body = ClientDto),
        (status = 404, description = "Client not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_client(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let client = ClientService::new(&state.db).get(auth.tenant_id, id).await?;

    Ok((StatusCode::OK, Json(client.into_dto())))
}

/// Replace a client's details.
///
/// # Access Control
/// - `Manager` and above
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = CLIENT_TAG,
    params(
        ("id" = i32, Path, description = "Client ID")
    ),
    request_body = ClientInputDto,
    responses(
        (status = 200, description = "Client updated", body = ClientDto),
        (status = 400, description = "Blank client name", body = ErrorDto),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 404, description = "Client not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_client(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
    Json(payload): Json<ClientInputDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    let client = ClientService::new(&state.db)
        .update(auth.tenant_id, id, ClientParams::from_dto(payload))
        .await?;

    Ok((StatusCode::OK, Json(client.into_dto())))
}

/// Delete a client, unlinking it from work orders and tasks first.
///
/// # Access Control
/// - `Manager` and above
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = CLIENT_TAG,
    params(
        ("id" = i32, Path, description = "Client ID")
    ),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 403, description = "Caller is below manager", body = ErrorDto),
        (status = 404, description = "Client not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn delete_client(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    CleanupService::new(&state.db, &state.realtime, &state.config.upload_dir)
        .delete_client(auth.tenant_id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
