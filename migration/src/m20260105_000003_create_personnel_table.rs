use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000001_create_tenant_table::Tenant,
    m20260105_000002_create_user_table::User,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Personnel::Table)
                    .if_not_exists()
                    .col(pk_auto(Personnel::Id))
                    .col(integer(Personnel::TenantId))
                    .col(integer(Personnel::UserId))
                    .col(string(Personnel::Role))
                    .col(string_null(Personnel::Title))
                    .col(boolean(Personnel::Active).default(false))
                    .col(
                        timestamp_with_time_zone(Personnel::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_personnel_tenant_id")
                            .from(Personnel::Table, Personnel::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_personnel_user_id")
                            .from(Personnel::Table, Personnel::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_personnel_tenant_user_unique")
                            .col(Personnel::TenantId)
                            .col(Personnel::UserId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Personnel::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Personnel {
    Table,
    Id,
    TenantId,
    UserId,
    Role,
    Title,
    Active,
    CreatedAt,
}
