//! Task assignee join table.

use chrono::Utc;
use sea_orm::{
    ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

pub struct TaskAssigneeRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TaskAssigneeRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Personnel ids assigned to a task in assignment order.
    pub async fn get_personnel_ids(&self, task_id: i32) -> Result<Vec<i32>, DbErr> {
        entity::prelude::TaskAssignee::find()
            .select_only()
            .column(entity::task_assignee::Column::PersonnelId)
            .filter(entity::task_assignee::Column::TaskId.eq(task_id))
            .order_by_asc(entity::task_assignee::Column::Id)
            .into_tuple()
            .all(self.db)
            .await
    }

    /// Adds assignees. Callers pass only ids that are not yet assigned.
    pub async fn add(&self, task_id: i32, personnel_ids: &[i32]) -> Result<(), DbErr> {
        if personnel_ids.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let rows = personnel_ids
            .iter()
            .map(|personnel_id| entity::task_assignee::ActiveModel {
                task_id: ActiveValue::Set(task_id),
                personnel_id: ActiveValue::Set(*personnel_id),
                assigned_at: ActiveValue::Set(now),
                ..Default::default()
            });
        entity::prelude::TaskAssignee::insert_many(rows)
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Removes the given personnel from the given tasks.
    pub async fn remove(&self, task_ids: &[i32], personnel_ids: &[i32]) -> Result<u64, DbErr> {
        if task_ids.is_empty() || personnel_ids.is_empty() {
            return Ok(0);
        }

        let result = entity::prelude::TaskAssignee::delete_many()
            .filter(entity::task_assignee::Column::TaskId.is_in(task_ids.iter().copied()))
            .filter(
                entity::task_assignee::Column::PersonnelId.is_in(personnel_ids.iter().copied()),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn delete_by_task(&self, task_id: i32) -> Result<(), DbErr> {
        entity::prelude::TaskAssignee::delete_many()
            .filter(entity::task_assignee::Column::TaskId.eq(task_id))
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Removes a personnel record from every task it is assigned to.
    pub async fn delete_by_personnel(&self, personnel_id: i32) -> Result<u64, DbErr> {
        let result = entity::prelude::TaskAssignee::delete_many()
            .filter(entity::task_assignee::Column::PersonnelId.eq(personnel_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
