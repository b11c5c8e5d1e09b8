//! In-memory entity models for unit tests. Nothing here touches the database.
//!
//! ```rust,ignore
//! use test_utils::fixture;
//!
//! let task = fixture::task::entity_builder().recurrence("weekly").build();
//! ```

pub mod personnel;
pub mod task;
pub mod user;

pub use personnel::{entity as personnel_entity, entity_builder as personnel_entity_builder};
pub use task::{entity as task_entity, entity_builder as task_entity_builder};
pub use user::entity as user_entity;
