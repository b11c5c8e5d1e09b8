//! Route table and OpenAPI document.
//!
//! Routes are registered through `utoipa-axum` so the OpenAPI document is collected from
//! the handlers' `#[utoipa::path]` annotations. The document is served by Swagger UI at
//! `/api/docs`.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

use crate::server::{
    config::Config,
    controller::{
        attachment::{self, ATTACHMENT_TAG},
        auth::{self, AUTH_TAG},
        calendar::{self, CALENDAR_TAG},
        check_in::{self, CHECK_IN_TAG},
        client::{self, CLIENT_TAG},
        notification::{self, NOTIFICATION_TAG},
        personnel::{self, PERSONNEL_TAG},
        realtime::{self, REALTIME_TAG},
        status::{self, STATUS_TAG},
        task::{self, TASK_TAG},
        tenant::{self, TENANT_TAG},
        work_order::{self, WORK_ORDER_TAG},
    },
    error::{config::ConfigError, AppError},
    state::AppState,
};

/// One magic-link request is replenished per this many seconds, per client IP.
const MAGIC_LINK_REPLENISH_SECONDS: u64 = 6;
const MAGIC_LINK_BURST: u32 = 5;

/// Allowance for multipart boundaries and headers on top of the file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "fieldops",
        description = "Multi-tenant field service management API"
    ),
    tags(
        (name = AUTH_TAG, description = "Signup, magic links and sessions"),
        (name = TENANT_TAG, description = "Active tenant settings"),
        (name = PERSONNEL_TAG, description = "Tenant members and invitations"),
        (name = CLIENT_TAG, description = "Customer records"),
        (name = STATUS_TAG, description = "Kanban board columns"),
        (name = TASK_TAG, description = "Tasks, board, timeline and quick add"),
        (name = WORK_ORDER_TAG, description = "Work orders and crew assignment"),
        (name = NOTIFICATION_TAG, description = "In-app notifications"),
        (name = CHECK_IN_TAG, description = "Time tracking sessions"),
        (name = ATTACHMENT_TAG, description = "Task file uploads"),
        (name = CALENDAR_TAG, description = "Scheduled tasks and work orders"),
        (name = REALTIME_TAG, description = "WebSocket event stream")
    )
)]
struct ApiDoc;

/// Builds the application router.
///
/// # Arguments
/// - `config` - Supplies the CORS origin and the upload size limit
///
/// # Returns
/// - `Ok(Router)` - Router awaiting its `AppState`
/// - `Err(ConfigError::InvalidRateLimit)` - Governor rejected the rate limit settings
/// - `Err(ConfigError::InvalidEnvVar)` - `APP_URL` has no usable origin
pub fn router(config: &Config) -> Result<Router<AppState>, AppError> {
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(MAGIC_LINK_REPLENISH_SECONDS)
        .burst_size(MAGIC_LINK_BURST)
        .finish()
        .ok_or(ConfigError::InvalidRateLimit)?;

    let rate_limited = OpenApiRouter::new()
        .routes(routes!(auth::request_magic_link))
        .layer(GovernorLayer::new(Arc::new(governor_conf)));

    let uploads = OpenApiRouter::new()
        .routes(routes!(
            attachment::upload_attachments,
            attachment::get_task_attachments
        ))
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        ));

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(rate_limited)
        .merge(uploads)
        .routes(routes!(auth::signup))
        .routes(routes!(auth::consume_magic_link))
        .routes(routes!(auth::get_user))
        .routes(routes!(auth::logout))
        .routes(routes!(auth::switch_tenant))
        .routes(routes!(tenant::get_tenant, tenant::update_tenant))
        .routes(routes!(
            personnel::get_personnel,
            personnel::invite_personnel
        ))
        .routes(routes!(
            personnel::update_personnel,
            personnel::delete_personnel
        ))
        .routes(routes!(client::get_clients, client::create_client))
        .routes(routes!(
            client::get_client,
            client::update_client,
            client::delete_client
        ))
        .routes(routes!(status::get_statuses, status::create_status))
        .routes(routes!(status::reorder_statuses))
        .routes(routes!(status::update_status, status::delete_status))
        .routes(routes!(task::get_board))
        .routes(routes!(task::get_tasks, task::create_task))
        .routes(routes!(task::parse_task))
        .routes(routes!(task::quick_add_task))
        .routes(routes!(
            task::get_task,
            task::update_task,
            task::delete_task
        ))
        .routes(routes!(task::move_task))
        .routes(routes!(task::set_task_assignees))
        .routes(routes!(task::get_task_timeline))
        .routes(routes!(task::comment_on_task))
        .routes(routes!(
            work_order::get_work_orders,
            work_order::create_work_order
        ))
        .routes(routes!(
            work_order::get_work_order,
            work_order::update_work_order,
            work_order::delete_work_order
        ))
        .routes(routes!(work_order::set_work_order_personnel))
        .routes(routes!(work_order::get_work_order_tasks))
        .routes(routes!(notification::get_notifications))
        .routes(routes!(notification::mark_notification_read))
        .routes(routes!(notification::mark_all_notifications_read))
        .routes(routes!(check_in::get_check_ins, check_in::start_check_in))
        .routes(routes!(check_in::get_active_check_in))
        .routes(routes!(check_in::heartbeat_check_in))
        .routes(routes!(check_in::check_out))
        .routes(routes!(
            attachment::download_attachment,
            attachment::delete_attachment
        ))
        .routes(routes!(calendar::get_calendar))
        .routes(routes!(realtime::connect))
        .split_for_parts();

    let router = router
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", api))
        .layer(cors_layer(config)?)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

/// Allows credentialed requests from the frontend's origin only.
fn cors_layer(config: &Config) -> Result<CorsLayer, AppError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        name: "APP_URL".to_string(),
        value: config.app_url.clone(),
        reason,
    };

    let origin = url::Url::parse(&config.app_url)
        .map_err(|e| invalid(e.to_string()))?
        .origin()
        .ascii_serialization();
    let origin = HeaderValue::from_str(&origin).map_err(|e| invalid(e.to_string()))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}
