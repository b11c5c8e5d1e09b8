use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No user id is stored in the session.
    ///
    /// Results in a 401 Unauthorized response.
    #[error("User not found in session")]
    UserNotInSession,

    /// The session refers to a user that no longer exists.
    ///
    /// Results in a 401 Unauthorized response; the client should log in again.
    #[error("User {0} from session not found in database")]
    UserNotInDatabase(i32),

    /// The user has no active personnel record in the requested tenant.
    ///
    /// Results in a 403 Forbidden response.
    #[error("User {0} is not an active member of tenant {1}")]
    NotTenantMember(i32, i32),

    /// The user is a member but lacks the required role or task access.
    ///
    /// Results in a 403 Forbidden response. The reason is logged, not returned.
    #[error("User {0} denied access: {1}")]
    AccessDenied(i32, String),

    /// The magic link token does not exist or was already consumed.
    ///
    /// Results in a 400 Bad Request response.
    #[error("Magic link is invalid or already used")]
    MagicLinkInvalid,

    /// The magic link token exists but its TTL has passed.
    ///
    /// Results in a 410 Gone response.
    #[error("Magic link has expired")]
    MagicLinkExpired,
}

/// Converts authentication errors into HTTP responses.
///
/// All errors are logged at debug level for diagnostics while keeping client-facing messages
/// generic to avoid information leakage.
///
/// # Returns
/// - 400 Bad Request - For invalid magic links
/// - 401 Unauthorized - For missing or unknown session users
/// - 403 Forbidden - For non-members and insufficient permissions
/// - 410 Gone - For expired magic links
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!("{}", self);

        let (status, message) = match self {
            Self::UserNotInSession | Self::UserNotInDatabase(_) => {
                (StatusCode::UNAUTHORIZED, "Not logged in")
            }
            Self::NotTenantMember(_, _) => (
                StatusCode::FORBIDDEN,
                "You are not a member of this organization",
            ),
            Self::AccessDenied(_, _) => (
                StatusCode::FORBIDDEN,
                "You do not have permission to do that",
            ),
            Self::MagicLinkInvalid => (
                StatusCode::BAD_REQUEST,
                "This login link is invalid or has already been used",
            ),
            Self::MagicLinkExpired => (StatusCode::GONE, "This login link has expired"),
        };

        (
            status,
            Json(ErrorDto {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
