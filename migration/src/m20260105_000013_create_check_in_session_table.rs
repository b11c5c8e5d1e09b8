use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CheckInSession::Table)
                    .if_not_exists()
                    .col(pk_auto(CheckInSession::Id))
                    .col(integer(CheckInSession::TenantId))
                    .col(integer(CheckInSession::PersonnelId))
                    .col(integer_null(CheckInSession::WorkOrderId))
                    .col(integer_null(CheckInSession::TaskId))
                    .col(text_null(CheckInSession::Note))
                    .col(timestamp_with_time_zone(CheckInSession::StartedAt))
                    .col(timestamp_with_time_zone(CheckInSession::LastHeartbeatAt))
                    .col(timestamp_with_time_zone_null(CheckInSession::EndedAt))
                    .col(string_null(CheckInSession::EndReason))
                    .col(integer_null(CheckInSession::DurationMinutes))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_check_in_session_personnel_id")
                    .table(CheckInSession::Table)
                    .col(CheckInSession::PersonnelId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_check_in_session_personnel_id")
                    .table(CheckInSession::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(CheckInSession::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum CheckInSession {
    Table,
    Id,
    TenantId,
    PersonnelId,
    WorkOrderId,
    TaskId,
    Note,
    StartedAt,
    LastHeartbeatAt,
    EndedAt,
    EndReason,
    DurationMinutes,
}
