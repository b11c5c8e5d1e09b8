//! SeaORM entity definitions for every fieldops table.
//!
//! Each module mirrors one migration in the `migration` crate. Enumerated values
//! (roles, priorities, statuses) are stored as lowercase strings and parsed into
//! typed enums by the server's domain model layer.

pub mod prelude;

pub mod attachment;
pub mod check_in_session;
pub mod client;
pub mod magic_link;
pub mod notification;
pub mod personnel;
pub mod status;
pub mod task;
pub mod task_assignee;
pub mod task_timeline;
pub mod tenant;
pub mod user;
pub mod work_order;
pub mod work_order_personnel;
