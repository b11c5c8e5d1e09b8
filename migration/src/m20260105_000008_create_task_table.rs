use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000001_create_tenant_table::Tenant,
    m20260105_000004_create_client_table::Client,
    m20260105_000005_create_status_table::Status,
    m20260105_000006_create_work_order_table::WorkOrder,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Task::Table)
                    .if_not_exists()
                    .col(pk_auto(Task::Id))
                    .col(integer(Task::TenantId))
                    .col(integer(Task::ColumnId))
                    .col(integer(Task::Position))
                    .col(string(Task::Title))
                    .col(text_null(Task::Description))
                    .col(string(Task::Priority))
                    .col(integer_null(Task::WorkOrderId))
                    .col(integer_null(Task::ClientId))
                    .col(timestamp_with_time_zone_null(Task::StartAt))
                    .col(timestamp_with_time_zone_null(Task::DueAt))
                    .col(double_null(Task::EstimatedHours))
                    .col(string_null(Task::Recurrence))
                    .col(timestamp_with_time_zone_null(Task::ReminderAt))
                    .col(boolean(Task::ReminderSent).default(false))
                    .col(timestamp_with_time_zone_null(Task::CompletedAt))
                    .col(integer_null(Task::CreatedBy))
                    .col(
                        timestamp_with_time_zone(Task::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Task::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_tenant_id")
                            .from(Task::Table, Task::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_column_id")
                            .from(Task::Table, Task::ColumnId)
                            .to(Status::Table, Status::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_work_order_id")
                            .from(Task::Table, Task::WorkOrderId)
                            .to(WorkOrder::Table, WorkOrder::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_client_id")
                            .from(Task::Table, Task::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_task_column_position")
                    .table(Task::Table)
                    .col(Task::ColumnId)
                    .col(Task::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_task_column_position")
                    .table(Task::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Task::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Task {
    Table,
    Id,
    TenantId,
    ColumnId,
    Position,
    Title,
    Description,
    Priority,
    WorkOrderId,
    ClientId,
    StartAt,
    DueAt,
    EstimatedHours,
    Recurrence,
    ReminderAt,
    ReminderSent,
    CompletedAt,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
