//! Database repository layer for all domain entities.
//!
//! This module contains repository structs that handle database operations for each
//! domain in the application. Repositories use SeaORM entity models internally and return
//! domain models from `server::model` so business logic never handles raw rows. Every
//! tenant-owned lookup takes the tenant id, and a row owned by another tenant is reported
//! exactly like a missing one.

pub mod attachment;
pub mod check_in;
pub mod client;
pub mod magic_link;
pub mod notification;
pub mod personnel;
pub mod status;
pub mod task;
pub mod task_assignee;
pub mod tenant;
pub mod timeline;
pub mod user;
pub mod work_order;
pub mod work_order_personnel;

#[cfg(test)]
mod test;
