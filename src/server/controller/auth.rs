use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        auth::{CurrentUserDto, MagicLinkRequestDto, SignupDto},
        tenant::TenantDto,
    },
    server::{
        data::personnel::PersonnelRepository,
        error::{auth::AuthError, AppError},
        middleware::{
            auth::{AuthContext, AuthGuard},
            session::AuthSession,
        },
        model::{personnel::Personnel, user::User},
        service::{magic_link::MagicLinkService, tenant::TenantService},
        state::AppState,
    },
};

pub static AUTH_TAG: &str = "auth";

/// Register a new tenant with its owner.
///
/// Creates the tenant with a unique slug, the owner's user and personnel records and the
/// default board columns, then emails an activation link to the owner.
///
/// # Access Control
/// - Public
///
/// # Returns
/// - `201 Created` - The new tenant
/// - `400 Bad Request` - Blank tenant name, owner name or email
/// - `409 Conflict` - No free slug could be derived from the name
#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = AUTH_TAG,
    request_body = SignupDto,
    responses(
        (status = 201, description = "Tenant created and activation link sent", body = TenantDto),
        (status = 400, description = "Invalid signup data", body = ErrorDto),
        (status = 409, description = "Slug could not be allocated", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupDto>,
) -> Result<impl IntoResponse, AppError> {
    let links = MagicLinkService::new(&state.db, &state.delivery, &state.config);
    let tenant = TenantService::new(&state.db).signup(payload, &links).await?;

    Ok((StatusCode::CREATED, Json(tenant.into_dto())))
}

/// Request a login link by email.
///
/// Always answers `202 Accepted`, whether or not the email belongs to an active member of
/// the tenant, so the endpoint cannot be used to enumerate accounts. Rate-limited per IP.
///
/// # Access Control
/// - Public
#[utoipa::path(
    post,
    path = "/api/auth/magic-link",
    tag = AUTH_TAG,
    request_body = MagicLinkRequestDto,
    responses(
        (status = 202, description = "Request accepted"),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn request_magic_link(
    State(state): State<AppState>,
    Json(payload): Json<MagicLinkRequestDto>,
) -> Result<impl IntoResponse, AppError> {
    MagicLinkService::new(&state.db, &state.delivery, &state.config)
        .request_login(&payload.email, &payload.tenant_slug)
        .await?;

    Ok(StatusCode::ACCEPTED)
}

/// Consume a magic link and start a session.
///
/// # Access Control
/// - Public; the token is the credential
///
/// # Arguments
/// - `token` - Raw token from the emailed link
///
/// # Returns
/// - `200 OK` - Logged in; the current user
/// - `400 Bad Request` - Unknown or already consumed token
/// - `410 Gone` - Expired token
#[utoipa::path(
    get,
    path = "/api/auth/magic-link/{token}",
    tag = AUTH_TAG,
    params(
        ("token" = String, Path, description = "Magic link token")
    ),
    responses(
        (status = 200, description = "Logged in", body = CurrentUserDto),
        (status = 400, description = "Magic link is invalid or already used", body = ErrorDto),
        (status = 410, description = "Magic link has expired", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn consume_magic_link(
    State(state): State<AppState>,
    session: Session,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (user, tenant_id) = MagicLinkService::new(&state.db, &state.delivery, &state.config)
        .consume(&token)
        .await?;

    let personnel = PersonnelRepository::new(&state.db)
        .find_by_user(tenant_id, user.id)
        .await?
        .filter(|p| p.active)
        .ok_or(AuthError::NotTenantMember(user.id, tenant_id))?;

    AuthSession::new(&session).login(user.id, tenant_id).await?;

    tracing::info!(user_id = user.id, tenant_id, "User logged in via magic link");

    let current = current_user(&state.db, user, personnel).await?;

    Ok((StatusCode::OK, Json(current)))
}

/// Get the logged-in user with their active tenant and role.
///
/// # Access Control
/// - Any active member of the session's tenant
#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = AUTH_TAG,
    responses(
        (status = 200, description = "Current user", body = CurrentUserDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Not an active member of the tenant", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_user(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let AuthContext {
        user, personnel, ..
    } = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let current = current_user(&state.db, user, personnel).await?;

    Ok((StatusCode::OK, Json(current)))
}

/// Clear the session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = AUTH_TAG,
    responses(
        (status = 204, description = "Logged out")
    ),
)]
pub async fn logout(session: Session) -> Result<impl IntoResponse, AppError> {
    AuthSession::new(&session).clear().await;

    Ok(StatusCode::NO_CONTENT)
}

/// Switch the session to another tenant.
///
/// # Access Control
/// - Logged-in user with an active personnel record in the target tenant
///
/// # Arguments
/// - `tenant_id` - Tenant to make active
///
/// # Returns
/// - `200 OK` - The current user within the new tenant
/// - `401 Unauthorized` - Not logged in
/// - `403 Forbidden` - Not an active member of the target tenant
#[utoipa::path(
    post,
    path = "/api/auth/tenant/{tenant_id}",
    tag = AUTH_TAG,
    params(
        ("tenant_id" = i32, Path, description = "Tenant ID")
    ),
    responses(
        (status = 200, description = "Active tenant switched", body = CurrentUserDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Not an active member of the tenant", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn switch_tenant(
    State(state): State<AppState>,
    session: Session,
    Path(tenant_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require_user().await?;

    let personnel = PersonnelRepository::new(&state.db)
        .find_by_user(tenant_id, user.id)
        .await?
        .filter(|p| p.active)
        .ok_or(AuthError::NotTenantMember(user.id, tenant_id))?;

    AuthSession::new(&session).set_tenant_id(tenant_id).await?;

    let current = current_user(&state.db, user, personnel).await?;

    Ok((StatusCode::OK, Json(current)))
}

async fn current_user(
    db: &DatabaseConnection,
    user: User,
    personnel: Personnel,
) -> Result<CurrentUserDto, AppError> {
    let tenant = TenantService::new(db).get(personnel.tenant_id).await?;

    Ok(CurrentUserDto {
        user: user.into_dto(),
        tenant: tenant.into_dto(),
        personnel_id: personnel.id,
        role: personnel.role,
    })
}
