pub use super::attachment::Entity as Attachment;
pub use super::check_in_session::Entity as CheckInSession;
pub use super::client::Entity as Client;
pub use super::magic_link::Entity as MagicLink;
pub use super::notification::Entity as Notification;
pub use super::personnel::Entity as Personnel;
pub use super::status::Entity as Status;
pub use super::task::Entity as Task;
pub use super::task_assignee::Entity as TaskAssignee;
pub use super::task_timeline::Entity as TaskTimeline;
pub use super::tenant::Entity as Tenant;
pub use super::user::Entity as User;
pub use super::work_order::Entity as WorkOrder;
pub use super::work_order_personnel::Entity as WorkOrderPersonnel;
