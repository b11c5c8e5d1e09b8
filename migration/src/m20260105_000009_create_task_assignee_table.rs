use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000003_create_personnel_table::Personnel,
    m20260105_000008_create_task_table::Task,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TaskAssignee::Table)
                    .if_not_exists()
                    .col(pk_auto(TaskAssignee::Id))
                    .col(integer(TaskAssignee::TaskId))
                    .col(integer(TaskAssignee::PersonnelId))
                    .col(
                        timestamp_with_time_zone(TaskAssignee::AssignedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_assignee_task_id")
                            .from(TaskAssignee::Table, TaskAssignee::TaskId)
                            .to(Task::Table, Task::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_assignee_personnel_id")
                            .from(TaskAssignee::Table, TaskAssignee::PersonnelId)
                            .to(Personnel::Table, Personnel::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_task_assignee_unique")
                            .col(TaskAssignee::TaskId)
                            .col(TaskAssignee::PersonnelId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaskAssignee::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TaskAssignee {
    Table,
    Id,
    TaskId,
    PersonnelId,
    AssignedAt,
}
