use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000008_create_task_table::Task;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attachment::Table)
                    .if_not_exists()
                    .col(pk_auto(Attachment::Id))
                    .col(integer(Attachment::TenantId))
                    .col(integer(Attachment::TaskId))
                    .col(string(Attachment::FileName))
                    .col(string(Attachment::ContentType))
                    .col(big_integer(Attachment::SizeBytes))
                    .col(string_uniq(Attachment::StorageKey))
                    .col(integer_null(Attachment::UploadedBy))
                    .col(
                        timestamp_with_time_zone(Attachment::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachment_task_id")
                            .from(Attachment::Table, Attachment::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attachment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Attachment {
    Table,
    Id,
    TenantId,
    TaskId,
    FileName,
    ContentType,
    SizeBytes,
    StorageKey,
    UploadedBy,
    CreatedAt,
}
