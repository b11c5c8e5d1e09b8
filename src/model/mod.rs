//! Wire types exchanged with API clients.
//!
//! DTOs here are plain serde structs with OpenAPI schemas. The server converts its
//! domain models into these at the controller boundary and converts request bodies
//! into operation parameters before calling services.

pub mod api;
pub mod attachment;
pub mod auth;
pub mod calendar;
pub mod check_in;
pub mod client;
pub mod notification;
pub mod patch;
pub mod personnel;
pub mod quick_add;
pub mod status;
pub mod task;
pub mod tenant;
pub mod work_order;
