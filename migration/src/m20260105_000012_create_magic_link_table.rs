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
                    .table(MagicLink::Table)
                    .if_not_exists()
                    .col(pk_auto(MagicLink::Id))
                    .col(integer(MagicLink::TenantId))
                    .col(integer(MagicLink::UserId))
                    .col(string_uniq(MagicLink::TokenHash))
                    .col(string(MagicLink::Purpose))
                    .col(timestamp_with_time_zone(MagicLink::ExpiresAt))
                    .col(timestamp_with_time_zone_null(MagicLink::ConsumedAt))
                    .col(
                        timestamp_with_time_zone(MagicLink::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_magic_link_tenant_id")
                            .from(MagicLink::Table, MagicLink::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_magic_link_user_id")
                            .from(MagicLink::Table, MagicLink::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MagicLink::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum MagicLink {
    Table,
    Id,
    TenantId,
    UserId,
    TokenHash,
    Purpose,
    ExpiresAt,
    ConsumedAt,
    CreatedAt,
}
