//! Deletion paths that must leave no dangling references behind.
//!
//! Deleting a task, work order, client or personnel record touches several tables and,
//! for attachments, the filesystem. Each path here removes dependents first so foreign
//! keys never block the final delete, then fixes up whatever was denormalized from the
//! removed row (column positions, work order rollups, open check-ins).

use std::path::Path;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::{
    model::{check_in::CheckInEndReason, personnel::Role},
    server::{
        data::{
            attachment::AttachmentRepository, check_in::CheckInRepository,
            client::ClientRepository, personnel::PersonnelRepository,
            task::TaskRepository, task_assignee::TaskAssigneeRepository,
            timeline::TimelineRepository, work_order::WorkOrderRepository,
            work_order_personnel::WorkOrderPersonnelRepository,
        },
        error::{auth::AuthError, AppError},
        model::{check_in::duration_minutes, personnel::Personnel, task::Task},
        realtime::{RealtimeHub, Room},
        service::{attachment::remove_file, progress::ProgressService},
    },
};

pub struct CleanupService<'a> {
    db: &'a DatabaseConnection,
    realtime: &'a RealtimeHub,
    upload_dir: &'a Path,
}

impl<'a> CleanupService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        realtime: &'a RealtimeHub,
        upload_dir: &'a Path,
    ) -> Self {
        Self {
            db,
            realtime,
            upload_dir,
        }
    }

    /// Deletes a task with its assignees, timeline and attachments.
    ///
    /// Compacts the positions of the task's column and recomputes its work order.
    ///
    /// # Returns
    /// - `Ok(())` - Task deleted
    /// - `Err(AppError::NotFound)` - Task not in the tenant
    pub async fn delete_task(&self, tenant_id: i32, task_id: i32) -> Result<(), AppError> {
        let task = TaskRepository::new(self.db)
            .find_by_id(tenant_id, task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        self.remove_task(&task).await?;

        let task_repo = TaskRepository::new(self.db);
        let remaining = task_repo.get_column_task_ids(task.column_id).await?;
        task_repo.place(task.column_id, &remaining).await?;

        if let Some(work_order_id) = task.work_order_id {
            ProgressService::new(self.db, self.realtime)
                .recompute_all_or_log(tenant_id, &[work_order_id])
                .await;
        }

        Ok(())
    }

    async fn remove_task(&self, task: &Task) -> Result<(), AppError> {
        let attachment_repo = AttachmentRepository::new(self.db);
        for attachment in attachment_repo.get_by_task(task.id).await? {
            if let Err(e) = remove_file(self.upload_dir, &attachment.storage_key).await {
                tracing::error!(
                    attachment_id = attachment.id,
                    "Failed to remove attachment file: {}",
                    e
                );
            }
            attachment_repo.delete(attachment.id).await?;
        }

        TaskAssigneeRepository::new(self.db)
            .delete_by_task(task.id)
            .await?;
        TimelineRepository::new(self.db)
            .delete_by_task(task.id)
            .await?;
        TaskRepository::new(self.db).delete(task.id).await?;

        tracing::info!(tenant_id = task.tenant_id, task_id = task.id, "Task deleted");
        self.realtime.publish(
            task.tenant_id,
            Room::Tenant,
            "task.deleted",
            &serde_json::json!({ "id": task.id, "column_id": task.column_id }),
        );

        Ok(())
    }

    /// Deletes a work order, its linked tasks and crew links.
    ///
    /// Open check-ins logged against it are closed with `work_order_deleted`.
    pub async fn delete_work_order(
        &self,
        tenant_id: i32,
        work_order_id: i32,
    ) -> Result<(), AppError> {
        WorkOrderRepository::new(self.db)
            .find_by_id(tenant_id, work_order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Work order not found".to_string()))?;

        let task_repo = TaskRepository::new(self.db);
        let tasks = task_repo.get_by_work_order(tenant_id, work_order_id).await?;
        let mut columns: Vec<i32> = tasks.iter().map(|t| t.column_id).collect();
        for task in &tasks {
            self.remove_task(task).await?;
        }

        columns.sort_unstable();
        columns.dedup();
        for column_id in columns {
            let remaining = task_repo.get_column_task_ids(column_id).await?;
            task_repo.place(column_id, &remaining).await?;
        }

        WorkOrderPersonnelRepository::new(self.db)
            .delete_by_work_order(work_order_id)
            .await?;

        let check_in_repo = CheckInRepository::new(self.db);
        let now = Utc::now();
        for session in check_in_repo.get_open_by_work_order(work_order_id).await? {
            check_in_repo
                .close(
                    session.id,
                    now,
                    CheckInEndReason::WorkOrderDeleted,
                    duration_minutes(session.started_at, now),
                )
                .await?;
        }

        WorkOrderRepository::new(self.db)
            .delete(work_order_id)
            .await?;

        tracing::info!(tenant_id, work_order_id, "Work order deleted");
        self.realtime.publish(
            tenant_id,
            Room::Tenant,
            "work_order.deleted",
            &serde_json::json!({ "id": work_order_id }),
        );

        Ok(())
    }

    /// Unlinks a client from work orders and tasks, then deletes it.
    pub async fn delete_client(&self, tenant_id: i32, client_id: i32) -> Result<(), AppError> {
        let client_repo = ClientRepository::new(self.db);
        client_repo
            .find_by_id(tenant_id, client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

        let work_orders = WorkOrderRepository::new(self.db)
            .unlink_client(client_id)
            .await?;
        let tasks = TaskRepository::new(self.db).unlink_client(client_id).await?;
        client_repo.delete(client_id).await?;

        tracing::info!(tenant_id, client_id, work_orders, tasks, "Client deleted");
        self.realtime.publish(
            tenant_id,
            Room::Tenant,
            "client.deleted",
            &serde_json::json!({ "id": client_id }),
        );

        Ok(())
    }

    /// Removes a personnel record from the tenant.
    ///
    /// Drops the person from every task and work order and closes their open check-in with
    /// `removed`.
    ///
    /// # Returns
    /// - `Ok(())` - Personnel removed
    /// - `Err(AppError::NotFound)` - Not in the tenant
    /// - `Err(AuthError::AccessDenied)` - A non-owner tried to remove an owner
    /// - `Err(AppError::Conflict)` - The tenant's last owner
    pub async fn delete_personnel(
        &self,
        actor: &Personnel,
        personnel_id: i32,
    ) -> Result<(), AppError> {
        let tenant_id = actor.tenant_id;
        let personnel_repo = PersonnelRepository::new(self.db);
        let personnel = personnel_repo
            .find_by_id(tenant_id, personnel_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Personnel not found".to_string()))?;

        if personnel.role == Role::Owner && actor.role != Role::Owner {
            return Err(AuthError::AccessDenied(
                actor.user_id,
                "only owners may remove owners".to_string(),
            )
            .into());
        }

        if personnel.role == Role::Owner && personnel_repo.count_owners(tenant_id).await? <= 1 {
            return Err(AppError::Conflict(
                "The last owner cannot be removed".to_string(),
            ));
        }

        let tasks = TaskAssigneeRepository::new(self.db)
            .delete_by_personnel(personnel_id)
            .await?;
        let work_orders = WorkOrderPersonnelRepository::new(self.db)
            .delete_by_personnel(personnel_id)
            .await?;

        let check_in_repo = CheckInRepository::new(self.db);
        if let Some(session) = check_in_repo.find_open_by_personnel(personnel_id).await? {
            let now = Utc::now();
            check_in_repo
                .close(
                    session.id,
                    now,
                    CheckInEndReason::Removed,
                    duration_minutes(session.started_at, now),
                )
                .await?;
        }

        personnel_repo.delete(personnel_id).await?;

        tracing::info!(tenant_id, personnel_id, tasks, work_orders, "Personnel removed");
        self.realtime.publish(
            tenant_id,
            Room::Tenant,
            "personnel.removed",
            &serde_json::json!({ "id": personnel_id }),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::work_order::WorkOrderStatus;
    use sea_orm::EntityTrait;
    use test_utils::{builder::TestBuilder, factory};

    /// Tests deleting a task in the middle of a column.
    ///
    /// Verifies positions are compacted and the work order counts drop.
    ///
    /// Expected: remaining tasks at 0..n, task_count reduced
    #[tokio::test]
    async fn delete_task_compacts_column_and_rolls_up() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
        let work_order = factory::create_work_order(db, member.tenant.id).await?;
        let mut ids = Vec::new();
        for position in 0..3 {
            let task = factory::task::TaskFactory::new(db, member.tenant.id, todo.id)
                .position(position)
                .work_order_id(work_order.id)
                .build()
                .await?;
            ids.push(task.id);
        }
        factory::task::assign(db, ids[1], member.personnel.id).await?;

        CleanupService::new(db, &realtime, &std::env::temp_dir())
            .delete_task(member.tenant.id, ids[1])
            .await?;

        let task_repo = TaskRepository::new(db);
        assert_eq!(task_repo.get_column_task_ids(todo.id).await?, vec![ids[0], ids[2]]);
        let last = task_repo.find_by_id(member.tenant.id, ids[2]).await?.unwrap();
        assert_eq!(last.position, 1);

        let work_order = WorkOrderRepository::new(db)
            .find_by_id(member.tenant.id, work_order.id)
            .await?
            .unwrap();
        assert_eq!(work_order.task_count, 2);

        Ok(())
    }

    /// Tests deleting a work order with linked tasks and an open check-in.
    ///
    /// Expected: tasks and crew links gone, check-in closed as work_order_deleted
    #[tokio::test]
    async fn delete_work_order_removes_tasks_and_closes_check_ins() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
        let work_order = factory::create_work_order(db, member.tenant.id).await?;
        factory::work_order::assign_personnel(db, work_order.id, member.personnel.id).await?;
        let kept = factory::create_task(db, member.tenant.id, todo.id).await?;
        factory::task::TaskFactory::new(db, member.tenant.id, todo.id)
            .position(1)
            .work_order_id(work_order.id)
            .build()
            .await?;
        let session = factory::check_in_session::CheckInSessionFactory::new(
            db,
            member.tenant.id,
            member.personnel.id,
        )
        .work_order_id(work_order.id)
        .build()
        .await?;

        CleanupService::new(db, &realtime, &std::env::temp_dir())
            .delete_work_order(member.tenant.id, work_order.id)
            .await?;

        let task_repo = TaskRepository::new(db);
        assert_eq!(task_repo.get_column_task_ids(todo.id).await?, vec![kept.id]);
        assert!(WorkOrderRepository::new(db)
            .find_by_id(member.tenant.id, work_order.id)
            .await?
            .is_none());
        assert!(entity::prelude::WorkOrderPersonnel::find()
            .all(db)
            .await?
            .is_empty());

        let closed = CheckInRepository::new(db)
            .find_by_id(member.tenant.id, session.id)
            .await?
            .unwrap();
        assert_eq!(closed.end_reason, Some(CheckInEndReason::WorkOrderDeleted));

        Ok(())
    }

    /// Tests that deleting a client keeps its work orders and tasks, unlinked.
    ///
    /// Expected: client_id cleared on both
    #[tokio::test]
    async fn delete_client_unlinks_references() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
        let client = factory::create_client(db, member.tenant.id).await?;
        let work_order = factory::work_order::WorkOrderFactory::new(db, member.tenant.id)
            .client_id(client.id)
            .build()
            .await?;
        let task = factory::task::TaskFactory::new(db, member.tenant.id, todo.id)
            .client_id(client.id)
            .build()
            .await?;

        CleanupService::new(db, &realtime, &std::env::temp_dir())
            .delete_client(member.tenant.id, client.id)
            .await?;

        assert!(ClientRepository::new(db)
            .find_by_id(member.tenant.id, client.id)
            .await?
            .is_none());
        let work_order = WorkOrderRepository::new(db)
            .find_by_id(member.tenant.id, work_order.id)
            .await?
            .unwrap();
        assert_eq!(work_order.client_id, None);
        assert_eq!(work_order.status, WorkOrderStatus::Pending);
        let task = TaskRepository::new(db)
            .find_by_id(member.tenant.id, task.id)
            .await?
            .unwrap();
        assert_eq!(task.client_id, None);

        Ok(())
    }

    async fn load(
        db: &DatabaseConnection,
        personnel: &entity::personnel::Model,
    ) -> Result<Personnel, AppError> {
        Ok(PersonnelRepository::new(db)
            .find_by_id(personnel.tenant_id, personnel.id)
            .await?
            .unwrap())
    }

    /// Tests the last-owner guard and removal of a technician's assignments.
    ///
    /// Expected: Conflict for the sole owner; the technician is removed everywhere
    #[tokio::test]
    async fn delete_personnel_guards_last_owner() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();
        let upload_dir = std::env::temp_dir();
        let service = CleanupService::new(db, &realtime, &upload_dir);

        let member = factory::create_member(db).await?;
        let owner = load(db, &member.personnel).await?;
        let (_, tech) = factory::helpers::add_member(db, member.tenant.id, "technician").await?;
        let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
        let task = factory::create_task(db, member.tenant.id, todo.id).await?;
        factory::task::assign(db, task.id, tech.id).await?;

        let result = service.delete_personnel(&owner, owner.id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        service.delete_personnel(&owner, tech.id).await?;

        assert!(PersonnelRepository::new(db)
            .find_by_id(member.tenant.id, tech.id)
            .await?
            .is_none());
        assert!(TaskAssigneeRepository::new(db)
            .get_personnel_ids(task.id)
            .await?
            .is_empty());

        Ok(())
    }

    /// Tests removing the only active owner while a second owner is still invited.
    ///
    /// Expected: Conflict, since the invited owner cannot sign in
    #[tokio::test]
    async fn delete_personnel_ignores_invited_owners() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();
        let upload_dir = std::env::temp_dir();

        let member = factory::create_member(db).await?;
        let owner = load(db, &member.personnel).await?;
        let invited = factory::create_user(db).await?;
        factory::personnel::PersonnelFactory::new(db, member.tenant.id, invited.id)
            .role("owner")
            .active(false)
            .build()
            .await?;

        let result = CleanupService::new(db, &realtime, &upload_dir)
            .delete_personnel(&owner, owner.id)
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(PersonnelRepository::new(db)
            .find_by_id(member.tenant.id, owner.id)
            .await?
            .is_some());

        Ok(())
    }

    /// Tests an admin removing one of two owners.
    ///
    /// Expected: AccessDenied, and the owner is kept
    #[tokio::test]
    async fn admin_cannot_remove_owner() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();
        let upload_dir = std::env::temp_dir();

        let member = factory::create_member(db).await?;
        let (_, second_owner) =
            factory::helpers::add_member(db, member.tenant.id, "owner").await?;
        let (_, admin) = factory::helpers::add_member(db, member.tenant.id, "admin").await?;
        let admin = load(db, &admin).await?;

        let result = CleanupService::new(db, &realtime, &upload_dir)
            .delete_personnel(&admin, second_owner.id)
            .await;

        assert!(matches!(
            result,
            Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
        ));
        assert!(PersonnelRepository::new(db)
            .find_by_id(member.tenant.id, second_owner.id)
            .await?
            .is_some());

        Ok(())
    }
}
