//! Factories that insert test rows with sensible defaults.
//!
//! Each module exposes a `*Factory` builder for customization and a `create_*`
//! shorthand for the common case. Factories never create parents implicitly except
//! in [`helpers`], which builds whole member/tenant graphs.
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let member = factory::helpers::create_member(db).await?;
//! let client = factory::client::ClientFactory::new(db, member.tenant.id)
//!     .name("Acme Plumbing")
//!     .build()
//!     .await?;
//! ```

pub mod check_in_session;
pub mod client;
pub mod helpers;
pub mod magic_link;
pub mod notification;
pub mod personnel;
pub mod status;
pub mod task;
pub mod tenant;
pub mod user;
pub mod work_order;

pub use client::create_client;
pub use helpers::{create_member, create_member_with_role, Member};
pub use personnel::create_personnel;
pub use status::{create_default_columns, create_status};
pub use task::create_task;
pub use tenant::create_tenant;
pub use user::create_user;
pub use work_order::create_work_order;
