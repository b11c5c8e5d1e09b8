//! Application state shared across all request handlers.
//!
//! The state is built once during startup and cloned into every handler through Axum's
//! state extraction. It holds:
//! - The database connection pool
//! - The realtime hub that fans events out to WebSocket clients
//! - The email/SMS delivery service
//! - The loaded configuration

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::server::{config::Config, realtime::RealtimeHub, service::delivery::DeliveryService};

/// Application state containing shared resources and dependencies.
///
/// All fields are cheap to clone: the connection pool and the broadcast sender are
/// reference-counted, the delivery service wraps a `reqwest::Client`, and the
/// configuration sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for accessing persistent storage.
    pub db: DatabaseConnection,

    /// Broadcast hub that services publish state changes to.
    pub realtime: RealtimeHub,

    /// Outbound email and SMS.
    ///
    /// Its HTTP client is built without redirects so provider URLs from configuration
    /// cannot be bounced elsewhere.
    pub delivery: DeliveryService,

    /// Configuration loaded from the environment at startup.
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new application state with the provided dependencies.
    ///
    /// # Arguments
    /// - `db` - Database connection pool
    /// - `realtime` - Realtime hub, shared with the background scheduler
    /// - `delivery` - Email and SMS delivery service
    /// - `config` - Application configuration
    ///
    /// # Returns
    /// - `AppState` - Initialized application state ready for use
    pub fn new(
        db: DatabaseConnection,
        realtime: RealtimeHub,
        delivery: DeliveryService,
        config: Arc<Config>,
    ) -> Self {
        Self {
            db,
            realtime,
            delivery,
            config,
        }
    }
}
