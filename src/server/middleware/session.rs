//! Type-safe session management wrappers.
//!
//! The session holds the authenticated user id and the tenant the user is currently
//! working in. Both are written together at login and read by [`AuthGuard`] on every
//! request.
//!
//! [`AuthGuard`]: crate::server::middleware::auth::AuthGuard

use tower_sessions::Session;

use crate::server::error::AppError;

// Session key constants
const SESSION_AUTH_USER_ID: &str = "auth:user";
const SESSION_AUTH_TENANT_ID: &str = "auth:tenant";

/// Authentication session management.
///
/// Handles the logged-in user and active tenant, and session lifecycle operations.
pub struct AuthSession<'a> {
    /// The underlying tower-sessions Session instance.
    session: &'a Session,
}

impl<'a> AuthSession<'a> {
    /// Creates a new AuthSession wrapper.
    ///
    /// # Arguments
    /// - `session` - Reference to the tower-sessions Session to wrap
    ///
    /// # Returns
    /// A new AuthSession instance
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Stores the user and active tenant after a successful login.
    ///
    /// The session id is cycled first so a pre-login session id cannot be reused.
    ///
    /// # Returns
    /// - `Ok(())` - Both ids stored
    /// - `Err(AppError::SessionErr(_))` - Failed to store in session
    pub async fn login(&self, user_id: i32, tenant_id: i32) -> Result<(), AppError> {
        self.session.cycle_id().await?;
        self.set_user_id(user_id).await?;
        self.set_tenant_id(tenant_id).await
    }

    /// Stores the user's id in the session.
    ///
    /// # Returns
    /// - `Ok(())` - User id successfully stored
    /// - `Err(AppError::SessionErr(_))` - Failed to store in session
    pub async fn set_user_id(&self, user_id: i32) -> Result<(), AppError> {
        self.session.insert(SESSION_AUTH_USER_ID, user_id).await?;
        Ok(())
    }

    /// Retrieves the logged-in user's id.
    ///
    /// # Returns
    /// - `Ok(Some(user_id))` - User is logged in
    /// - `Ok(None)` - No user in session (not logged in)
    /// - `Err(AppError::SessionErr(_))` - Failed to access session
    pub async fn get_user_id(&self) -> Result<Option<i32>, AppError> {
        Ok(self.session.get::<i32>(SESSION_AUTH_USER_ID).await?)
    }

    /// Switches the active tenant.
    pub async fn set_tenant_id(&self, tenant_id: i32) -> Result<(), AppError> {
        self.session
            .insert(SESSION_AUTH_TENANT_ID, tenant_id)
            .await?;
        Ok(())
    }

    pub async fn get_tenant_id(&self) -> Result<Option<i32>, AppError> {
        Ok(self.session.get::<i32>(SESSION_AUTH_TENANT_ID).await?)
    }

    /// Clears all data from the session.
    ///
    /// Used during logout to remove the user and tenant.
    pub async fn clear(&self) {
        self.session.clear().await;
    }
}
