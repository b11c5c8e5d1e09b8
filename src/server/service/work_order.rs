//! Work orders and crew assignment.

use sea_orm::DatabaseConnection;

use crate::{
    model::notification::NotificationKind,
    server::{
        data::{
            client::ClientRepository, task::TaskRepository, task_assignee::TaskAssigneeRepository,
            timeline::TimelineRepository, work_order::WorkOrderRepository,
            work_order_personnel::WorkOrderPersonnelRepository,
        },
        error::AppError,
        model::{
            notification::NewNotification,
            personnel::Personnel,
            task::{Task, TimelineKind},
            total_pages,
            work_order::{
                CreateWorkOrderParams, PaginatedWorkOrders, UpdateWorkOrderParams, WorkOrder,
                WorkOrderFilter,
            },
        },
        realtime::{RealtimeHub, Room},
        service::{
            notification::NotificationService, personnel::PersonnelService,
            progress::ProgressService,
        },
    },
};

pub struct WorkOrderService<'a> {
    db: &'a DatabaseConnection,
    realtime: &'a RealtimeHub,
}

impl<'a> WorkOrderService<'a> {
    pub fn new(db: &'a DatabaseConnection, realtime: &'a RealtimeHub) -> Self {
        Self { db, realtime }
    }

    /// # Arguments
    /// - `viewer` - `None` for managers, otherwise only work orders crewed by this personnel
    pub async fn get_paginated(
        &self,
        tenant_id: i32,
        filter: &WorkOrderFilter,
        viewer: Option<i32>,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedWorkOrders, AppError> {
        let (work_orders, total) = WorkOrderRepository::new(self.db)
            .get_paginated(tenant_id, filter, viewer, page, per_page)
            .await?;

        Ok(PaginatedWorkOrders {
            work_orders,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    pub async fn get(&self, tenant_id: i32, id: i32) -> Result<WorkOrder, AppError> {
        WorkOrderRepository::new(self.db)
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Work order not found".to_string()))
    }

    pub async fn get_tasks(&self, tenant_id: i32, id: i32) -> Result<Vec<Task>, AppError> {
        let work_order = self.get(tenant_id, id).await?;

        Ok(TaskRepository::new(self.db)
            .get_by_work_order(tenant_id, work_order.id)
            .await?)
    }

    async fn check_client(&self, tenant_id: i32, client_id: i32) -> Result<(), AppError> {
        ClientRepository::new(self.db)
            .find_by_id(tenant_id, client_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::BadRequest(format!("Unknown client {}", client_id)))
    }

    /// Creates a pending work order and assigns its initial crew.
    ///
    /// # Returns
    /// - `Ok(WorkOrder)` - The created work order with crew
    /// - `Err(AppError::BadRequest)` - Empty title, or client or personnel outside the tenant
    pub async fn create(
        &self,
        actor: &Personnel,
        params: CreateWorkOrderParams,
    ) -> Result<WorkOrder, AppError> {
        let tenant_id = actor.tenant_id;
        if params.title.is_empty() {
            return Err(AppError::BadRequest("Title is required".to_string()));
        }
        if let Some(client_id) = params.client_id {
            self.check_client(tenant_id, client_id).await?;
        }
        let crew: Vec<i32> = PersonnelService::new(self.db, self.realtime)
            .resolve(tenant_id, &params.personnel_ids)
            .await?
            .iter()
            .map(|p| p.id)
            .collect();

        let created = WorkOrderRepository::new(self.db)
            .create(tenant_id, &params, Some(actor.id))
            .await?;
        WorkOrderPersonnelRepository::new(self.db)
            .add(created.id, &crew)
            .await?;
        let work_order = self.get(tenant_id, created.id).await?;

        self.notify_assigned(actor, &work_order, &crew).await;

        tracing::info!(tenant_id, work_order_id = work_order.id, "Work order created");
        self.realtime.publish(
            tenant_id,
            Room::Tenant,
            "work_order.created",
            &work_order.clone().into_dto(),
        );

        Ok(work_order)
    }

    /// Applies a partial update.
    ///
    /// An explicit status change is followed by a rollup so task completion still decides
    /// the final status, except for `cancelled` which sticks.
    pub async fn update(
        &self,
        tenant_id: i32,
        id: i32,
        params: UpdateWorkOrderParams,
    ) -> Result<WorkOrder, AppError> {
        let current = self.get(tenant_id, id).await?;
        if params.title.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::BadRequest("Title is required".to_string()));
        }
        if let Some(Some(client_id)) = params.client_id {
            self.check_client(tenant_id, client_id).await?;
        }
        let status_changed = params.status.is_some_and(|s| s != current.status);

        WorkOrderRepository::new(self.db).update(id, params).await?;
        if status_changed {
            ProgressService::new(self.db, self.realtime)
                .recompute_from(tenant_id, id, Some(current.status))
                .await?;
        }
        let work_order = self.get(tenant_id, id).await?;

        self.realtime.publish(
            tenant_id,
            Room::Tenant,
            "work_order.updated",
            &work_order.clone().into_dto(),
        );

        Ok(work_order)
    }

    /// Replaces the crew and propagates the change to every linked task.
    ///
    /// Added personnel become assignees of linked tasks that lack them and get one
    /// notification for the work order. Removed personnel are unassigned from linked tasks.
    ///
    /// # Returns
    /// - `Ok(WorkOrder)` - The work order with its new crew
    /// - `Err(AppError::NotFound)` - Work order not in the tenant
    /// - `Err(AppError::BadRequest)` - An id is not personnel of the tenant
    pub async fn set_personnel(
        &self,
        actor: &Personnel,
        id: i32,
        personnel_ids: &[i32],
    ) -> Result<WorkOrder, AppError> {
        let tenant_id = actor.tenant_id;
        let work_order = self.get(tenant_id, id).await?;
        let wanted = PersonnelService::new(self.db, self.realtime)
            .resolve(tenant_id, personnel_ids)
            .await?;

        let current = work_order.personnel_ids();
        let added: Vec<&Personnel> = wanted.iter().filter(|p| !current.contains(&p.id)).collect();
        let added_ids: Vec<i32> = added.iter().map(|p| p.id).collect();
        let removed: Vec<(i32, String)> = work_order
            .personnel
            .iter()
            .filter(|s| !wanted.iter().any(|p| p.id == s.personnel_id))
            .map(|s| (s.personnel_id, s.name.clone()))
            .collect();
        let removed_ids: Vec<i32> = removed.iter().map(|(pid, _)| *pid).collect();

        let crew_repo = WorkOrderPersonnelRepository::new(self.db);
        crew_repo.remove(id, &removed_ids).await?;
        crew_repo.add(id, &added_ids).await?;

        let assignee_repo = TaskAssigneeRepository::new(self.db);
        let timeline_repo = TimelineRepository::new(self.db);
        for task_id in TaskRepository::new(self.db).get_ids_by_work_order(id).await? {
            let assigned = assignee_repo.get_personnel_ids(task_id).await?;
            let to_add: Vec<&Personnel> = added
                .iter()
                .copied()
                .filter(|p| !assigned.contains(&p.id))
                .collect();
            let to_remove: Vec<&(i32, String)> = removed
                .iter()
                .filter(|(pid, _)| assigned.contains(pid))
                .collect();
            if to_add.is_empty() && to_remove.is_empty() {
                continue;
            }

            let add_ids: Vec<i32> = to_add.iter().map(|p| p.id).collect();
            let remove_ids: Vec<i32> = to_remove.iter().map(|(pid, _)| *pid).collect();
            assignee_repo.add(task_id, &add_ids).await?;
            assignee_repo.remove(&[task_id], &remove_ids).await?;

            let entries = to_add
                .iter()
                .map(|p| (TimelineKind::Assigned, format!("Assigned {} via work order", p.name)))
                .chain(to_remove.iter().map(|(_, name)| {
                    (TimelineKind::Unassigned, format!("Unassigned {} via work order", name))
                }));
            for (kind, message) in entries {
                if let Err(e) = timeline_repo
                    .create(tenant_id, task_id, Some(actor.id), kind, message)
                    .await
                {
                    tracing::error!(task_id, "Failed to write timeline entry: {}", e);
                }
            }
        }

        let work_order = self.get(tenant_id, id).await?;
        self.notify_assigned(actor, &work_order, &added_ids).await;

        tracing::info!(
            tenant_id,
            work_order_id = id,
            added = added_ids.len(),
            removed = removed_ids.len(),
            "Work order crew updated"
        );
        self.realtime.publish(
            tenant_id,
            Room::Tenant,
            "work_order.updated",
            &work_order.clone().into_dto(),
        );

        Ok(work_order)
    }

    async fn notify_assigned(&self, actor: &Personnel, work_order: &WorkOrder, recipients: &[i32]) {
        NotificationService::new(self.db, self.realtime)
            .notify_or_log(
                actor.tenant_id,
                recipients,
                Some(actor.id),
                &NewNotification::for_work_order(
                    NotificationKind::WorkOrderAssigned,
                    work_order.id,
                    work_order.title.clone(),
                    format!("{} assigned you to work order \"{}\"", actor.name, work_order.title),
                ),
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{task::Priority, work_order::WorkOrderStatus},
        server::data::{notification::NotificationRepository, personnel::PersonnelRepository},
    };
    use test_utils::{builder::TestBuilder, factory};

    async fn owner(db: &DatabaseConnection) -> Result<Personnel, AppError> {
        let member = factory::create_member(db).await?;
        Ok(PersonnelRepository::new(db)
            .find_by_id(member.tenant.id, member.personnel.id)
            .await?
            .unwrap())
    }

    /// Tests creating a work order with an initial crew.
    ///
    /// Expected: pending with zeroed progress, crew stored and notified
    #[tokio::test]
    async fn create_assigns_initial_crew() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let actor = owner(db).await?;
        let (tech_user, tech) =
            factory::helpers::add_member(db, actor.tenant_id, "technician").await?;

        let work_order = WorkOrderService::new(db, &realtime)
            .create(
                &actor,
                CreateWorkOrderParams {
                    title: "Rewire kitchen".to_string(),
                    description: None,
                    client_id: None,
                    priority: Priority::High,
                    scheduled_at: None,
                    due_at: None,
                    personnel_ids: vec![tech.id],
                },
            )
            .await?;

        assert_eq!(work_order.status, WorkOrderStatus::Pending);
        assert_eq!(work_order.progress, 0);
        assert_eq!(work_order.personnel_ids(), vec![tech.id]);
        assert_eq!(
            NotificationRepository::new(db)
                .count_unread(actor.tenant_id, tech_user.id)
                .await?,
            1
        );

        Ok(())
    }

    /// Tests replacing the crew of a work order with linked tasks.
    ///
    /// Expected: added person assigned to every linked task, removed person unassigned
    #[tokio::test]
    async fn set_personnel_propagates_to_tasks() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let actor = owner(db).await?;
        let tenant_id = actor.tenant_id;
        let (_, leaving) = factory::helpers::add_member(db, tenant_id, "technician").await?;
        let (joining_user, joining) =
            factory::helpers::add_member(db, tenant_id, "technician").await?;
        let [todo, _, _] = factory::create_default_columns(db, tenant_id).await?;
        let work_order = factory::create_work_order(db, tenant_id).await?;
        factory::work_order::assign_personnel(db, work_order.id, leaving.id).await?;
        let mut task_ids = Vec::new();
        for position in 0..2 {
            let task = factory::task::TaskFactory::new(db, tenant_id, todo.id)
                .position(position)
                .work_order_id(work_order.id)
                .build()
                .await?;
            factory::task::assign(db, task.id, leaving.id).await?;
            task_ids.push(task.id);
        }
        factory::task::assign(db, task_ids[1], joining.id).await?;

        let updated = WorkOrderService::new(db, &realtime)
            .set_personnel(&actor, work_order.id, &[joining.id])
            .await?;

        assert_eq!(updated.personnel_ids(), vec![joining.id]);
        let assignee_repo = TaskAssigneeRepository::new(db);
        for task_id in &task_ids {
            assert_eq!(
                assignee_repo.get_personnel_ids(*task_id).await?,
                vec![joining.id]
            );
        }
        assert_eq!(
            NotificationRepository::new(db)
                .count_unread(tenant_id, joining_user.id)
                .await?,
            1
        );
        let first_timeline = TimelineRepository::new(db).get_by_task(task_ids[0]).await?;
        assert_eq!(first_timeline.len(), 2);

        Ok(())
    }

    /// Tests cancelling a work order whose tasks are all done.
    ///
    /// Expected: status stays cancelled after the rollup
    #[tokio::test]
    async fn update_keeps_explicit_cancel() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let actor = owner(db).await?;
        let [_, _, done] = factory::create_default_columns(db, actor.tenant_id).await?;
        let work_order = factory::create_work_order(db, actor.tenant_id).await?;
        factory::task::TaskFactory::new(db, actor.tenant_id, done.id)
            .work_order_id(work_order.id)
            .completed_at(chrono::Utc::now())
            .build()
            .await?;

        let updated = WorkOrderService::new(db, &realtime)
            .update(
                actor.tenant_id,
                work_order.id,
                UpdateWorkOrderParams {
                    status: Some(WorkOrderStatus::Cancelled),
                    ..Default::default()
                },
            )
            .await?;

        assert_eq!(updated.status, WorkOrderStatus::Cancelled);
        assert_eq!(updated.progress, 100);

        Ok(())
    }

    /// Tests reading another tenant's work order.
    ///
    /// Expected: Err(AppError::NotFound)
    #[tokio::test]
    async fn get_hides_other_tenant() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let actor = owner(db).await?;
        let other = factory::create_tenant(db).await?;
        let foreign = factory::create_work_order(db, other.id).await?;

        let result = WorkOrderService::new(db, &realtime)
            .get(actor.tenant_id, foreign.id)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));

        Ok(())
    }
}
