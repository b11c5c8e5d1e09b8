use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000001_create_tenant_table::Tenant,
    m20260105_000004_create_client_table::Client,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkOrder::Table)
                    .if_not_exists()
                    .col(pk_auto(WorkOrder::Id))
                    .col(integer(WorkOrder::TenantId))
                    .col(integer_null(WorkOrder::ClientId))
                    .col(string(WorkOrder::Title))
                    .col(text_null(WorkOrder::Description))
                    .col(string(WorkOrder::Status))
                    .col(string(WorkOrder::Priority))
                    .col(timestamp_with_time_zone_null(WorkOrder::ScheduledAt))
                    .col(timestamp_with_time_zone_null(WorkOrder::DueAt))
                    .col(integer(WorkOrder::Progress).default(0))
                    .col(integer(WorkOrder::TaskCount).default(0))
                    .col(integer(WorkOrder::CompletedTaskCount).default(0))
                    .col(integer_null(WorkOrder::CreatedBy))
                    .col(
                        timestamp_with_time_zone(WorkOrder::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(WorkOrder::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_order_tenant_id")
                            .from(WorkOrder::Table, WorkOrder::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_order_client_id")
                            .from(WorkOrder::Table, WorkOrder::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkOrder::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum WorkOrder {
    Table,
    Id,
    TenantId,
    ClientId,
    Title,
    Description,
    Status,
    Priority,
    ScheduledAt,
    DueAt,
    Progress,
    TaskCount,
    CompletedTaskCount,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
