//! Work order progress rollup.
//!
//! Runs after anything that changes which tasks link to a work order or whether they are
//! complete. Counts, progress and status are recomputed from the tasks themselves rather
//! than adjusted incrementally.

use sea_orm::DatabaseConnection;

use crate::{
    model::{notification::NotificationKind, work_order::WorkOrderStatus},
    server::{
        data::{task::TaskRepository, work_order::WorkOrderRepository},
        error::AppError,
        model::{
            notification::NewNotification,
            work_order::{rollup, Rollup},
        },
        realtime::{RealtimeHub, Room},
        service::notification::NotificationService,
    },
};

pub struct ProgressService<'a> {
    db: &'a DatabaseConnection,
    realtime: &'a RealtimeHub,
}

impl<'a> ProgressService<'a> {
    pub fn new(db: &'a DatabaseConnection, realtime: &'a RealtimeHub) -> Self {
        Self { db, realtime }
    }

    /// Recomputes a work order's rollup from its linked tasks.
    ///
    /// # Returns
    /// - `Ok(Some(Rollup))` - The stored rollup
    /// - `Ok(None)` - Work order not found in the tenant
    /// - `Err(AppError::DbErr)` - Database error
    pub async fn recompute(
        &self,
        tenant_id: i32,
        work_order_id: i32,
    ) -> Result<Option<Rollup>, AppError> {
        self.recompute_from(tenant_id, work_order_id, None).await
    }

    /// Recomputes a rollup, comparing the resulting status against `previous`.
    ///
    /// Used after an explicit status update, where the stored status no longer reflects
    /// what the work order was before the request.
    pub async fn recompute_from(
        &self,
        tenant_id: i32,
        work_order_id: i32,
        previous: Option<WorkOrderStatus>,
    ) -> Result<Option<Rollup>, AppError> {
        let work_order_repo = WorkOrderRepository::new(self.db);

        let Some(work_order) = work_order_repo
            .find_by_id(tenant_id, work_order_id)
            .await?
        else {
            return Ok(None);
        };

        let (total, completed) = TaskRepository::new(self.db)
            .completion_counts(work_order_id)
            .await?;
        let result = rollup(work_order.status, total, completed);

        work_order_repo.apply_rollup(work_order_id, result).await?;

        let previous = previous.unwrap_or(work_order.status);
        if result.status == WorkOrderStatus::Completed && previous != WorkOrderStatus::Completed {
            tracing::info!(tenant_id, work_order_id, "Work order completed");

            NotificationService::new(self.db, self.realtime)
                .notify_or_log(
                    tenant_id,
                    &work_order.personnel_ids(),
                    None,
                    &NewNotification::for_work_order(
                        NotificationKind::WorkOrderCompleted,
                        work_order_id,
                        "Work order completed".to_string(),
                        format!("All tasks of \"{}\" are done", work_order.title),
                    ),
                )
                .await;
        }

        self.realtime.publish(
            tenant_id,
            Room::Tenant,
            "work_order.progress",
            &serde_json::json!({
                "id": work_order_id,
                "progress": result.progress,
                "task_count": result.task_count,
                "completed_task_count": result.completed_task_count,
                "status": result.status,
            }),
        );

        Ok(Some(result))
    }

    /// Recomputes each distinct work order in `ids`, logging failures.
    pub async fn recompute_all_or_log(&self, tenant_id: i32, ids: &[i32]) {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        for id in ids {
            if let Err(e) = self.recompute(tenant_id, id).await {
                tracing::error!(tenant_id, work_order_id = id, "Rollup failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};

    /// Tests rollup after all linked tasks complete.
    ///
    /// Verifies counts, progress, the completed status and that crew members are notified.
    ///
    /// Expected: 100% completed with one notification per crew member
    #[tokio::test]
    async fn completes_work_order_and_notifies_crew() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let (_, tech) = factory::helpers::add_member(db, member.tenant.id, "technician").await?;
        let [_, _, done] = factory::create_default_columns(db, member.tenant.id).await?;
        let work_order = factory::create_work_order(db, member.tenant.id).await?;
        factory::work_order::assign_personnel(db, work_order.id, tech.id).await?;
        for _ in 0..2 {
            factory::task::TaskFactory::new(db, member.tenant.id, done.id)
                .work_order_id(work_order.id)
                .completed_at(chrono::Utc::now())
                .build()
                .await?;
        }

        let result = ProgressService::new(db, &realtime)
            .recompute(member.tenant.id, work_order.id)
            .await?
            .unwrap();

        assert_eq!(result.task_count, 2);
        assert_eq!(result.completed_task_count, 2);
        assert_eq!(result.progress, 100);
        assert_eq!(result.status, WorkOrderStatus::Completed);

        let inbox = NotificationService::new(db, &realtime)
            .get_paginated(member.tenant.id, tech.user_id, false, 0, 10)
            .await?;
        assert_eq!(inbox.total, 1);
        assert_eq!(
            inbox.notifications[0].kind,
            NotificationKind::WorkOrderCompleted
        );

        Ok(())
    }

    /// Tests that a second recompute does not notify again.
    ///
    /// Expected: still one notification after recomputing twice
    #[tokio::test]
    async fn notifies_only_on_transition() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let (_, tech) = factory::helpers::add_member(db, member.tenant.id, "technician").await?;
        let [_, _, done] = factory::create_default_columns(db, member.tenant.id).await?;
        let work_order = factory::create_work_order(db, member.tenant.id).await?;
        factory::work_order::assign_personnel(db, work_order.id, tech.id).await?;
        factory::task::TaskFactory::new(db, member.tenant.id, done.id)
            .work_order_id(work_order.id)
            .completed_at(chrono::Utc::now())
            .build()
            .await?;

        let service = ProgressService::new(db, &realtime);
        service.recompute(member.tenant.id, work_order.id).await?;
        service.recompute(member.tenant.id, work_order.id).await?;

        let unread = NotificationService::new(db, &realtime)
            .get_paginated(member.tenant.id, tech.user_id, true, 0, 10)
            .await?
            .unread_count;
        assert_eq!(unread, 1);

        Ok(())
    }

    /// Tests that a cancelled work order keeps its status while counts update.
    ///
    /// Expected: cancelled with 50% progress
    #[tokio::test]
    async fn keeps_cancelled_status() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let [todo, _, done] = factory::create_default_columns(db, member.tenant.id).await?;
        let work_order = factory::work_order::WorkOrderFactory::new(db, member.tenant.id)
            .status("cancelled")
            .build()
            .await?;
        factory::task::TaskFactory::new(db, member.tenant.id, todo.id)
            .work_order_id(work_order.id)
            .build()
            .await?;
        factory::task::TaskFactory::new(db, member.tenant.id, done.id)
            .work_order_id(work_order.id)
            .completed_at(chrono::Utc::now())
            .build()
            .await?;

        let result = ProgressService::new(db, &realtime)
            .recompute(member.tenant.id, work_order.id)
            .await?
            .unwrap();

        assert_eq!(result.status, WorkOrderStatus::Cancelled);
        assert_eq!(result.progress, 50);

        Ok(())
    }
}
