//! Work order crew join table.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

pub struct WorkOrderPersonnelRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> WorkOrderPersonnelRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_personnel_ids(&self, work_order_id: i32) -> Result<Vec<i32>, DbErr> {
        entity::prelude::WorkOrderPersonnel::find()
            .select_only()
            .column(entity::work_order_personnel::Column::PersonnelId)
            .filter(entity::work_order_personnel::Column::WorkOrderId.eq(work_order_id))
            .order_by_asc(entity::work_order_personnel::Column::Id)
            .into_tuple()
            .all(self.db)
            .await
    }

    pub async fn add(&self, work_order_id: i32, personnel_ids: &[i32]) -> Result<(), DbErr> {
        if personnel_ids.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let rows = personnel_ids
            .iter()
            .map(|personnel_id| entity::work_order_personnel::ActiveModel {
                work_order_id: ActiveValue::Set(work_order_id),
                personnel_id: ActiveValue::Set(*personnel_id),
                assigned_at: ActiveValue::Set(now),
                ..Default::default()
            });
        entity::prelude::WorkOrderPersonnel::insert_many(rows)
            .exec(self.db)
            .await?;

        Ok(())
    }

    pub async fn remove(&self, work_order_id: i32, personnel_ids: &[i32]) -> Result<(), DbErr> {
        if personnel_ids.is_empty() {
            return Ok(());
        }

        entity::prelude::WorkOrderPersonnel::delete_many()
            .filter(entity::work_order_personnel::Column::WorkOrderId.eq(work_order_id))
            .filter(
                entity::work_order_personnel::Column::PersonnelId
                    .is_in(personnel_ids.iter().copied()),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    pub async fn delete_by_work_order(&self, work_order_id: i32) -> Result<(), DbErr> {
        entity::prelude::WorkOrderPersonnel::delete_many()
            .filter(entity::work_order_personnel::Column::WorkOrderId.eq(work_order_id))
            .exec(self.db)
            .await?;
        Ok(())
    }

    pub async fn delete_by_personnel(&self, personnel_id: i32) -> Result<u64, DbErr> {
        let result = entity::prelude::WorkOrderPersonnel::delete_many()
            .filter(entity::work_order_personnel::Column::PersonnelId.eq(personnel_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
