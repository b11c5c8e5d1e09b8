//! Service layer for business logic and orchestration.
//!
//! Services sit between the controllers and the repositories. They validate input,
//! coordinate repository calls and run the side effects that follow a write: timeline
//! entries, notifications, work order rollups, realtime events and outbound delivery.
//!
//! Side effects run after the primary write has succeeded. Their failures are logged and
//! never turn a successful request into an error.

pub mod attachment;
pub mod calendar;
pub mod check_in;
pub mod cleanup;
pub mod client;
pub mod delivery;
pub mod magic_link;
pub mod notification;
pub mod personnel;
pub mod progress;
pub mod quick_add;
pub mod reminder;
pub mod status;
pub mod task;
pub mod tenant;
pub mod work_order;
