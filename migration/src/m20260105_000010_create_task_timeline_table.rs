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
                    .table(TaskTimeline::Table)
                    .if_not_exists()
                    .col(pk_auto(TaskTimeline::Id))
                    .col(integer(TaskTimeline::TenantId))
                    .col(integer(TaskTimeline::TaskId))
                    .col(integer_null(TaskTimeline::ActorId))
                    .col(string(TaskTimeline::Kind))
                    .col(text(TaskTimeline::Message))
                    .col(
                        timestamp_with_time_zone(TaskTimeline::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_timeline_task_id")
                            .from(TaskTimeline::Table, TaskTimeline::TaskId)
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
            .drop_table(Table::drop().table(TaskTimeline::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TaskTimeline {
    Table,
    Id,
    TenantId,
    TaskId,
    ActorId,
    Kind,
    Message,
    CreatedAt,
}
