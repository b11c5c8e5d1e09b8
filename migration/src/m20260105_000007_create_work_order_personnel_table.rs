use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000003_create_personnel_table::Personnel,
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
                    .table(WorkOrderPersonnel::Table)
                    .if_not_exists()
                    .col(pk_auto(WorkOrderPersonnel::Id))
                    .col(integer(WorkOrderPersonnel::WorkOrderId))
                    .col(integer(WorkOrderPersonnel::PersonnelId))
                    .col(
                        timestamp_with_time_zone(WorkOrderPersonnel::AssignedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_order_personnel_work_order_id")
                            .from(WorkOrderPersonnel::Table, WorkOrderPersonnel::WorkOrderId)
                            .to(WorkOrder::Table, WorkOrder::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_work_order_personnel_personnel_id")
                            .from(WorkOrderPersonnel::Table, WorkOrderPersonnel::PersonnelId)
                            .to(Personnel::Table, Personnel::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .unique()
                            .name("idx_work_order_personnel_unique")
                            .col(WorkOrderPersonnel::WorkOrderId)
                            .col(WorkOrderPersonnel::PersonnelId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkOrderPersonnel::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum WorkOrderPersonnel {
    Table,
    Id,
    WorkOrderId,
    PersonnelId,
    AssignedAt,
}
