use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000001_create_tenant_table::Tenant;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Status::Table)
                    .if_not_exists()
                    .col(pk_auto(Status::Id))
                    .col(integer(Status::TenantId))
                    .col(string(Status::Name))
                    .col(string(Status::Color))
                    .col(integer(Status::Position))
                    .col(boolean(Status::IsCompleted).default(false))
                    .col(
                        timestamp_with_time_zone(Status::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_tenant_id")
                            .from(Status::Table, Status::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Status::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Status {
    Table,
    Id,
    TenantId,
    Name,
    Color,
    Position,
    IsCompleted,
    CreatedAt,
}
