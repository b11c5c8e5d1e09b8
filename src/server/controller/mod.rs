//! HTTP handlers.
//!
//! Each handler authenticates through `AuthGuard`, converts the request body into service
//! parameters, calls one service, and converts the domain result into a DTO. Handlers carry
//! `utoipa::path` annotations that the router collects into the OpenAPI document.

use serde::Deserialize;

pub mod attachment;
pub mod auth;
pub mod calendar;
pub mod check_in;
pub mod client;
pub mod notification;
pub mod personnel;
pub mod realtime;
pub mod status;
pub mod task;
pub mod tenant;
pub mod work_order;

#[derive(Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_entries")]
    pub entries: u64,
}

pub(crate) fn default_entries() -> u64 {
    10
}
