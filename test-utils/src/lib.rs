//! Fieldops Test Utils
//!
//! Shared helpers for the server's unit and integration tests: an in-memory SQLite
//! database with the fieldops schema, a session bound to the same pool, factories that
//! insert realistic rows, and fixtures that build entity models without touching the
//! database.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{builder::TestBuilder, factory};
//!
//! #[tokio::test]
//! async fn moves_task() -> Result<(), sea_orm::DbErr> {
//!     let test = TestBuilder::new().with_board_tables().build().await.unwrap();
//!     let db = test.db.as_ref().unwrap();
//!
//!     let member = factory::helpers::create_member(db).await?;
//!     let columns = factory::status::create_default_columns(db, member.tenant.id).await?;
//!     // ...
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
pub mod fixture;
