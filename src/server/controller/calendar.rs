use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    model::{api::ErrorDto, calendar::CalendarEventDto},
    server::{
        error::AppError, middleware::auth::AuthGuard, model::calendar::CalendarEvent,
        service::calendar::CalendarService, state::AppState,
    },
};

pub static CALENDAR_TAG: &str = "calendar";

#[derive(Deserialize)]
pub struct CalendarParams {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Get task and work order dates falling in a range, ordered by start.
///
/// # Access Control
/// - Any active member; technicians only see their visible tasks and work orders
///
/// # Returns
/// - `200 OK` - Calendar events
/// - `400 Bad Request` - `from` is not before `to`, or the range exceeds 366 days
#[utoipa::path(
    get,
    path = "/api/calendar",
    tag = CALENDAR_TAG,
    params(
        ("from" = DateTime<Utc>, Query, description = "Range start (RFC 3339)"),
        ("to" = DateTime<Utc>, Query, description = "Range end (RFC 3339)")
    ),
    responses(
        (status = 200, description = "Calendar events", body = Vec<CalendarEventDto>),
        (status = 400, description = "Invalid range", body = ErrorDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_calendar(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CalendarParams>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let events = CalendarService::new(&state.db)
        .get_events(auth.tenant_id, params.from, params.to, auth.viewer())
        .await?;

    let events_dto: Vec<CalendarEventDto> =
        events.into_iter().map(CalendarEvent::into_dto).collect();

    Ok((StatusCode::OK, Json(events_dto)))
}
