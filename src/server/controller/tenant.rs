use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        personnel::Role,
        tenant::{TenantDto, UpdateTenantDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        service::tenant::TenantService,
        state::AppState,
    },
};

pub static TENANT_TAG: &str = "tenant";

/// Get the active tenant.
///
/// # Access Control
/// - Any active member
#[utoipa::path(
    get,
    path = "/api/tenant",
    tag = TENANT_TAG,
    responses(
        (status = 200, description = "Active tenant", body = TenantDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_tenant(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let tenant = TenantService::new(&state.db).get(auth.tenant_id).await?;

    Ok((StatusCode::OK, Json(tenant.into_dto())))
}

/// Update the active tenant's name and timezone.
///
/// # Access Control
/// - `Admin` and above
///
/// # Returns
/// - `200 OK` - Updated tenant
/// - `400 Bad Request` - Blank name or timezone
/// - `403 Forbidden` - Caller is below admin
#[utoipa::path(
    put,
    path = "/api/tenant",
    tag = TENANT_TAG,
    request_body = UpdateTenantDto,
    responses(
        (status = 200, description = "Tenant updated", body = TenantDto),
        (status = 400, description = "Invalid tenant data", body = ErrorDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Caller is below admin", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_tenant(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<UpdateTenantDto>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session)
        .require(&[Permission::MinRole(Role::Admin)])
        .await?;

    let tenant = TenantService::new(&state.db)
        .update(auth.tenant_id, &payload.name, &payload.timezone)
        .await?;

    Ok((StatusCode::OK, Json(tenant.into_dto())))
}
