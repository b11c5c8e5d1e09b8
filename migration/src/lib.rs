pub use sea_orm_migration::prelude::*;

mod m20260105_000001_create_tenant_table;
mod m20260105_000002_create_user_table;
mod m20260105_000003_create_personnel_table;
mod m20260105_000004_create_client_table;
mod m20260105_000005_create_status_table;
mod m20260105_000006_create_work_order_table;
mod m20260105_000007_create_work_order_personnel_table;
mod m20260105_000008_create_task_table;
mod m20260105_000009_create_task_assignee_table;
mod m20260105_000010_create_task_timeline_table;
mod m20260105_000011_create_notification_table;
mod m20260105_000012_create_magic_link_table;
mod m20260105_000013_create_check_in_session_table;
mod m20260105_000014_create_attachment_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_000001_create_tenant_table::Migration),
            Box::new(m20260105_000002_create_user_table::Migration),
            Box::new(m20260105_000003_create_personnel_table::Migration),
            Box::new(m20260105_000004_create_client_table::Migration),
            Box::new(m20260105_000005_create_status_table::Migration),
            Box::new(m20260105_000006_create_work_order_table::Migration),
            Box::new(m20260105_000007_create_work_order_personnel_table::Migration),
            Box::new(m20260105_000008_create_task_table::Migration),
            Box::new(m20260105_000009_create_task_assignee_table::Migration),
            Box::new(m20260105_000010_create_task_timeline_table::Migration),
            Box::new(m20260105_000011_create_notification_table::Migration),
            Box::new(m20260105_000012_create_magic_link_table::Migration),
            Box::new(m20260105_000013_create_check_in_session_table::Migration),
            Box::new(m20260105_000014_create_attachment_table::Migration),
        ]
    }
}
