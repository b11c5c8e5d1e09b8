use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::server::{
    data::{status::StatusRepository, task::TaskRepository},
    error::AppError,
    model::status::{CreateStatusParams, Status, UpdateStatusParams},
    realtime::{RealtimeHub, Room},
    service::progress::ProgressService,
    util::ordering::{append, is_permutation},
};

pub struct StatusService<'a> {
    db: &'a DatabaseConnection,
    realtime: &'a RealtimeHub,
}

impl<'a> StatusService<'a> {
    pub fn new(db: &'a DatabaseConnection, realtime: &'a RealtimeHub) -> Self {
        Self { db, realtime }
    }

    pub async fn get_all(&self, tenant_id: i32) -> Result<Vec<Status>, AppError> {
        Ok(StatusRepository::new(self.db).get_all(tenant_id).await?)
    }

    async fn get(&self, tenant_id: i32, id: i32) -> Result<Status, AppError> {
        StatusRepository::new(self.db)
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Column not found".to_string()))
    }

    fn publish_board(&self, tenant_id: i32) {
        self.realtime.publish(
            tenant_id,
            Room::Tenant,
            "statuses.changed",
            &serde_json::json!({ "tenant_id": tenant_id }),
        );
    }

    /// Appends a column to the end of the board.
    pub async fn create(
        &self,
        tenant_id: i32,
        params: CreateStatusParams,
    ) -> Result<Status, AppError> {
        if params.name.is_empty() {
            return Err(AppError::BadRequest("Column name is required".to_string()));
        }

        let status = StatusRepository::new(self.db)
            .create(tenant_id, params)
            .await?;

        self.publish_board(tenant_id);

        Ok(status)
    }

    /// Updates a column.
    ///
    /// Toggling `is_completed` stamps or clears `completed_at` on every task in the column
    /// and recomputes the work orders those tasks belong to.
    ///
    /// # Returns
    /// - `Ok(Status)` - The updated column
    /// - `Err(AppError::NotFound)` - Column not in the tenant
    pub async fn update(
        &self,
        tenant_id: i32,
        id: i32,
        params: UpdateStatusParams,
    ) -> Result<Status, AppError> {
        let current = self.get(tenant_id, id).await?;
        if params.name.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::BadRequest("Column name is required".to_string()));
        }

        let toggled = params
            .is_completed
            .is_some_and(|completed| completed != current.is_completed);
        let status = StatusRepository::new(self.db).update(id, params).await?;

        if toggled {
            let task_repo = TaskRepository::new(self.db);
            let changed = task_repo
                .sync_column_completion(id, status.is_completed, Utc::now())
                .await?;
            tracing::info!(
                tenant_id,
                column_id = id,
                is_completed = status.is_completed,
                changed,
                "Column completion toggled"
            );

            let work_orders = task_repo.get_work_order_ids_in_column(id).await?;
            ProgressService::new(self.db, self.realtime)
                .recompute_all_or_log(tenant_id, &work_orders)
                .await;
        }

        self.publish_board(tenant_id);

        Ok(status)
    }

    /// Rewrites column positions to match `ids`.
    ///
    /// # Returns
    /// - `Ok(Vec<Status>)` - Columns in their new order
    /// - `Err(AppError::BadRequest)` - `ids` is not a permutation of the tenant's columns
    pub async fn reorder(&self, tenant_id: i32, ids: &[i32]) -> Result<Vec<Status>, AppError> {
        let status_repo = StatusRepository::new(self.db);
        let current: Vec<i32> = status_repo
            .get_all(tenant_id)
            .await?
            .iter()
            .map(|s| s.id)
            .collect();

        if !is_permutation(&current, ids) {
            return Err(AppError::BadRequest(
                "Order must list every column exactly once".to_string(),
            ));
        }

        status_repo.set_positions(ids).await?;
        self.publish_board(tenant_id);

        Ok(status_repo.get_all(tenant_id).await?)
    }

    /// Deletes a column, moving its tasks to `move_to` first.
    ///
    /// Moved tasks keep their relative order at the end of the target. Completion is
    /// re-synchronized against the target column and affected work orders are recomputed.
    ///
    /// # Returns
    /// - `Ok(())` - Column deleted and remaining positions compacted
    /// - `Err(AppError::NotFound)` - Column not in the tenant
    /// - `Err(AppError::Conflict)` - Last column, or tasks remain without a valid target
    pub async fn delete(
        &self,
        tenant_id: i32,
        id: i32,
        move_to: Option<i32>,
    ) -> Result<(), AppError> {
        let column = self.get(tenant_id, id).await?;
        let status_repo = StatusRepository::new(self.db);
        if status_repo.count(tenant_id).await? <= 1 {
            return Err(AppError::Conflict(
                "The last column cannot be deleted".to_string(),
            ));
        }

        let task_repo = TaskRepository::new(self.db);
        let task_ids = task_repo.get_column_task_ids(column.id).await?;
        if !task_ids.is_empty() {
            let target = match move_to {
                Some(target_id) if target_id != column.id => {
                    status_repo.find_by_id(tenant_id, target_id).await?
                }
                _ => None,
            }
            .ok_or_else(|| {
                AppError::Conflict(
                    "Column has tasks; choose another column to move them to".to_string(),
                )
            })?;

            let work_orders = task_repo.get_work_order_ids_in_column(column.id).await?;
            let existing = task_repo.get_column_task_ids(target.id).await?;
            task_repo
                .place(target.id, &append(&existing, &task_ids))
                .await?;
            task_repo
                .sync_column_completion(target.id, target.is_completed, Utc::now())
                .await?;

            if column.is_completed != target.is_completed {
                ProgressService::new(self.db, self.realtime)
                    .recompute_all_or_log(tenant_id, &work_orders)
                    .await;
            }
        }

        status_repo.delete(column.id).await?;
        let remaining: Vec<i32> = status_repo
            .get_all(tenant_id)
            .await?
            .iter()
            .map(|s| s.id)
            .collect();
        status_repo.set_positions(&remaining).await?;

        tracing::info!(tenant_id, column_id = id, "Column deleted");
        self.publish_board(tenant_id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::data::work_order::WorkOrderRepository;
    use test_utils::{builder::TestBuilder, factory};

    /// Tests marking a column completed.
    ///
    /// Expected: tasks in the column gain completed_at, work order reaches 100%
    #[tokio::test]
    async fn toggling_completion_syncs_tasks() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let [_, in_progress, _] = factory::create_default_columns(db, member.tenant.id).await?;
        let work_order = factory::create_work_order(db, member.tenant.id).await?;
        let task = factory::task::TaskFactory::new(db, member.tenant.id, in_progress.id)
            .work_order_id(work_order.id)
            .build()
            .await?;

        StatusService::new(db, &realtime)
            .update(
                member.tenant.id,
                in_progress.id,
                UpdateStatusParams {
                    is_completed: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        let task = TaskRepository::new(db)
            .find_by_id(member.tenant.id, task.id)
            .await?
            .unwrap();
        assert!(task.completed_at.is_some());
        let work_order = WorkOrderRepository::new(db)
            .find_by_id(member.tenant.id, work_order.id)
            .await?
            .unwrap();
        assert_eq!(work_order.progress, 100);

        Ok(())
    }

    /// Tests reordering with an id missing.
    ///
    /// Expected: Err(AppError::BadRequest)
    #[tokio::test]
    async fn reorder_requires_permutation() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let [todo, in_progress, done] =
            factory::create_default_columns(db, member.tenant.id).await?;
        let service = StatusService::new(db, &realtime);

        let result = service
            .reorder(member.tenant.id, &[todo.id, in_progress.id])
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let reordered = service
            .reorder(member.tenant.id, &[done.id, todo.id, in_progress.id])
            .await?;
        let ids: Vec<i32> = reordered.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![done.id, todo.id, in_progress.id]);
        assert_eq!(reordered[0].position, 0);

        Ok(())
    }

    /// Tests deleting a non-empty column without a target.
    ///
    /// Expected: Err(AppError::Conflict)
    #[tokio::test]
    async fn delete_non_empty_requires_target() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
        factory::create_task(db, member.tenant.id, todo.id).await?;
        let service = StatusService::new(db, &realtime);

        let missing = service.delete(member.tenant.id, todo.id, None).await;
        assert!(matches!(missing, Err(AppError::Conflict(_))));
        let itself = service
            .delete(member.tenant.id, todo.id, Some(todo.id))
            .await;
        assert!(matches!(itself, Err(AppError::Conflict(_))));

        Ok(())
    }

    /// Tests deleting a column and moving its tasks into the completed column.
    ///
    /// Expected: tasks appended after existing ones and completed, positions compacted
    #[tokio::test]
    async fn delete_moves_tasks_and_compacts() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let [todo, in_progress, done] =
            factory::create_default_columns(db, member.tenant.id).await?;
        let existing = factory::create_task(db, member.tenant.id, done.id).await?;
        let moved = factory::create_task(db, member.tenant.id, in_progress.id).await?;

        StatusService::new(db, &realtime)
            .delete(member.tenant.id, in_progress.id, Some(done.id))
            .await?;

        let task_repo = TaskRepository::new(db);
        assert_eq!(
            task_repo.get_column_task_ids(done.id).await?,
            vec![existing.id, moved.id]
        );
        let moved = task_repo
            .find_by_id(member.tenant.id, moved.id)
            .await?
            .unwrap();
        assert!(moved.completed_at.is_some());

        let columns = StatusRepository::new(db).get_all(member.tenant.id).await?;
        let positions: Vec<(i32, i32)> = columns.iter().map(|s| (s.id, s.position)).collect();
        assert_eq!(positions, vec![(todo.id, 0), (done.id, 1)]);

        Ok(())
    }

    /// Tests deleting the only column.
    ///
    /// Expected: Err(AppError::Conflict)
    #[tokio::test]
    async fn cannot_delete_last_column() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let only = factory::create_status(db, member.tenant.id).await?;

        let result = StatusService::new(db, &realtime)
            .delete(member.tenant.id, only.id, None)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));

        Ok(())
    }
}
