//! Kanban task orchestration.
//!
//! Every mutation runs the same chain after the write: a timeline entry, notifications to
//! the other assignees, the work order rollup when completion or linkage changed, and a
//! realtime event. Side effects after the write are logged on failure and never undo it.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::{
    model::notification::NotificationKind,
    server::{
        data::{
            client::ClientRepository, status::StatusRepository, task::TaskRepository,
            task_assignee::TaskAssigneeRepository, timeline::TimelineRepository,
            work_order::WorkOrderRepository,
        },
        error::AppError,
        model::{
            notification::NewNotification,
            personnel::Personnel,
            status::Status,
            task::{
                shift_by_recurrence, BoardColumn, CreateTaskParams, PaginatedTasks, Task,
                TaskFilter, TimelineEntry, TimelineKind, UpdateTaskParams,
            },
            total_pages,
            work_order::WorkOrder,
        },
        realtime::{RealtimeHub, Room},
        service::{
            notification::NotificationService, personnel::PersonnelService,
            progress::ProgressService,
        },
        util::ordering::plan_move,
    },
};

pub struct TaskService<'a> {
    db: &'a DatabaseConnection,
    realtime: &'a RealtimeHub,
}

impl<'a> TaskService<'a> {
    pub fn new(db: &'a DatabaseConnection, realtime: &'a RealtimeHub) -> Self {
        Self { db, realtime }
    }

    /// Every column in order with the tasks `viewer` may see.
    ///
    /// # Arguments
    /// - `viewer` - `None` for managers, the technician's personnel id otherwise
    pub async fn get_board(
        &self,
        tenant_id: i32,
        filter: &TaskFilter,
        viewer: Option<i32>,
    ) -> Result<Vec<BoardColumn>, AppError> {
        let statuses = StatusRepository::new(self.db).get_all(tenant_id).await?;
        let tasks = TaskRepository::new(self.db)
            .get_board(tenant_id, filter, viewer)
            .await?;

        let mut by_column: HashMap<i32, Vec<Task>> = HashMap::new();
        for task in tasks {
            by_column.entry(task.column_id).or_default().push(task);
        }

        Ok(statuses
            .into_iter()
            .map(|status| BoardColumn {
                tasks: by_column.remove(&status.id).unwrap_or_default(),
                status,
            })
            .collect())
    }

    pub async fn get_paginated(
        &self,
        tenant_id: i32,
        filter: &TaskFilter,
        viewer: Option<i32>,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedTasks, AppError> {
        let (tasks, total) = TaskRepository::new(self.db)
            .get_paginated(tenant_id, filter, viewer, page, per_page)
            .await?;

        Ok(PaginatedTasks {
            tasks,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    pub async fn get(&self, tenant_id: i32, id: i32) -> Result<Task, AppError> {
        TaskRepository::new(self.db)
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
    }

    pub async fn get_timeline(&self, task_id: i32) -> Result<Vec<TimelineEntry>, AppError> {
        Ok(TimelineRepository::new(self.db).get_by_task(task_id).await?)
    }

    async fn find_column(&self, tenant_id: i32, column_id: i32) -> Result<Status, AppError> {
        StatusRepository::new(self.db)
            .find_by_id(tenant_id, column_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Unknown column {}", column_id)))
    }

    async fn find_work_order(
        &self,
        tenant_id: i32,
        work_order_id: i32,
    ) -> Result<WorkOrder, AppError> {
        WorkOrderRepository::new(self.db)
            .find_by_id(tenant_id, work_order_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Unknown work order {}", work_order_id)))
    }

    async fn check_client(&self, tenant_id: i32, client_id: i32) -> Result<(), AppError> {
        ClientRepository::new(self.db)
            .find_by_id(tenant_id, client_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::BadRequest(format!("Unknown client {}", client_id)))
    }

    async fn log_timeline(
        &self,
        tenant_id: i32,
        task_id: i32,
        actor: Option<i32>,
        kind: TimelineKind,
        message: String,
    ) {
        if let Err(e) = TimelineRepository::new(self.db)
            .create(tenant_id, task_id, actor, kind, message)
            .await
        {
            tracing::error!(task_id, %kind, "Failed to write timeline entry: {}", e);
        }
    }

    async fn notify(
        &self,
        tenant_id: i32,
        recipients: &[i32],
        actor: Option<i32>,
        kind: NotificationKind,
        task: &Task,
        body: String,
    ) {
        NotificationService::new(self.db, self.realtime)
            .notify_or_log(
                tenant_id,
                recipients,
                actor,
                &NewNotification::for_task(kind, task.id, task.title.clone(), body),
            )
            .await;
    }

    async fn rollup(&self, tenant_id: i32, work_order_ids: &[Option<i32>]) {
        let ids: Vec<i32> = work_order_ids.iter().flatten().copied().collect();
        if !ids.is_empty() {
            ProgressService::new(self.db, self.realtime)
                .recompute_all_or_log(tenant_id, &ids)
                .await;
        }
    }

    /// Creates a task at the end of its column.
    ///
    /// The column defaults to the first one. A task linked to a work order without a client
    /// inherits the work order's client. Tasks created in a completed column start
    /// completed.
    ///
    /// # Returns
    /// - `Ok(Task)` - The created task with details
    /// - `Err(AppError::BadRequest)` - Empty title, or a column, work order, client or
    ///   assignee outside the tenant
    pub async fn create(
        &self,
        actor: &Personnel,
        mut params: CreateTaskParams,
    ) -> Result<Task, AppError> {
        let tenant_id = actor.tenant_id;
        if params.title.is_empty() {
            return Err(AppError::BadRequest("Title is required".to_string()));
        }

        let column = match params.column_id {
            Some(id) => self.find_column(tenant_id, id).await?,
            None => StatusRepository::new(self.db)
                .get_all(tenant_id)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| AppError::Conflict("The board has no columns".to_string()))?,
        };

        if let Some(work_order_id) = params.work_order_id {
            let work_order = self.find_work_order(tenant_id, work_order_id).await?;
            if params.client_id.is_none() {
                params.client_id = work_order.client_id;
            }
        }
        if let Some(client_id) = params.client_id {
            self.check_client(tenant_id, client_id).await?;
        }
        let assignees = PersonnelService::new(self.db, self.realtime)
            .resolve(tenant_id, &params.assignee_ids)
            .await?;
        let assignee_ids: Vec<i32> = assignees.iter().map(|p| p.id).collect();

        let task_repo = TaskRepository::new(self.db);
        let position = task_repo.count_in_column(column.id).await? as i32;
        let completed_at = column.is_completed.then(Utc::now);
        let created = task_repo
            .create(
                tenant_id,
                column.id,
                position,
                params,
                completed_at,
                Some(actor.id),
            )
            .await?;
        TaskAssigneeRepository::new(self.db)
            .add(created.id, &assignee_ids)
            .await?;
        let task = self.get(tenant_id, created.id).await?;

        self.log_timeline(
            tenant_id,
            task.id,
            Some(actor.id),
            TimelineKind::Created,
            format!("Created in {}", column.name),
        )
        .await;
        self.notify(
            tenant_id,
            &assignee_ids,
            Some(actor.id),
            NotificationKind::Assigned,
            &task,
            format!("{} assigned you to \"{}\"", actor.name, task.title),
        )
        .await;
        self.rollup(tenant_id, &[task.work_order_id]).await;

        tracing::info!(tenant_id, task_id = task.id, "Task created");
        self.realtime
            .publish(tenant_id, Room::Tenant, "task.created", &task.clone().into_dto());

        Ok(task)
    }

    /// Applies a partial update.
    ///
    /// Changing `reminder_at` re-arms the reminder. Relinking to a work order while the task
    /// has no client inherits the work order's client. Both the old and the new work order
    /// are recomputed after a relink.
    ///
    /// # Returns
    /// - `Ok(Task)` - The updated task
    /// - `Err(AppError::NotFound)` - Task not in the tenant
    /// - `Err(AppError::BadRequest)` - Empty title or foreign work order or client
    pub async fn update(
        &self,
        actor: &Personnel,
        id: i32,
        mut params: UpdateTaskParams,
    ) -> Result<Task, AppError> {
        let tenant_id = actor.tenant_id;
        let task = self.get(tenant_id, id).await?;

        if params.title.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::BadRequest("Title is required".to_string()));
        }
        if let Some(Some(work_order_id)) = params.work_order_id {
            let work_order = self.find_work_order(tenant_id, work_order_id).await?;
            let client_after = params.client_id.unwrap_or(task.client_id);
            if client_after.is_none() && work_order.client_id.is_some() {
                params.client_id = Some(work_order.client_id);
            }
        }
        if let Some(Some(client_id)) = params.client_id {
            self.check_client(tenant_id, client_id).await?;
        }

        let changed = params.changed_fields(&task);
        if changed.is_empty() {
            return Ok(task);
        }
        let new_work_order = params.work_order_id;

        TaskRepository::new(self.db)
            .update(id, params, changed.contains(&"reminder_at"))
            .await?;
        let updated = self.get(tenant_id, id).await?;

        self.log_timeline(
            tenant_id,
            id,
            Some(actor.id),
            TimelineKind::Updated,
            format!("Updated {}", changed.join(", ")),
        )
        .await;
        self.notify(
            tenant_id,
            &updated.assignee_ids(),
            Some(actor.id),
            NotificationKind::Updated,
            &updated,
            format!("{} updated {}", actor.name, changed.join(", ")),
        )
        .await;
        if let Some(new_work_order) = new_work_order {
            if new_work_order != task.work_order_id {
                self.rollup(tenant_id, &[task.work_order_id, new_work_order])
                    .await;
            }
        }

        let dto = updated.clone().into_dto();
        self.realtime
            .publish(tenant_id, Room::Tenant, "task.updated", &dto);
        self.realtime
            .publish(tenant_id, Room::Task(id), "task.updated", &dto);

        Ok(updated)
    }

    /// Moves a task to `position` in `column_id`, the kanban drag.
    ///
    /// Positions in both columns are rewritten densely. Crossing between a completed and an
    /// open column sets or clears `completed_at`; completing a recurring task spawns its
    /// next occurrence.
    ///
    /// # Returns
    /// - `Ok(Task)` - The moved task
    /// - `Err(AppError::NotFound)` - Task not in the tenant
    /// - `Err(AppError::BadRequest)` - Target column not in the tenant
    pub async fn move_task(
        &self,
        actor: &Personnel,
        id: i32,
        column_id: i32,
        position: i32,
    ) -> Result<Task, AppError> {
        let tenant_id = actor.tenant_id;
        let task = self.get(tenant_id, id).await?;
        let source = self.find_column(tenant_id, task.column_id).await?;
        let target = self.find_column(tenant_id, column_id).await?;
        let same_column = source.id == target.id;

        let task_repo = TaskRepository::new(self.db);
        let source_ids = task_repo.get_column_task_ids(source.id).await?;
        let target_ids = if same_column {
            source_ids.clone()
        } else {
            task_repo.get_column_task_ids(target.id).await?
        };

        let plan = plan_move(&source_ids, &target_ids, id, position, same_column);
        if !same_column {
            task_repo.place(source.id, &plan.source).await?;
        }
        task_repo.place(target.id, &plan.target).await?;

        let became_complete = !source.is_completed && target.is_completed;
        if source.is_completed != target.is_completed {
            task_repo
                .set_completed_at(id, became_complete.then(Utc::now))
                .await?;
        }
        let moved = self.get(tenant_id, id).await?;

        self.log_timeline(
            tenant_id,
            id,
            Some(actor.id),
            TimelineKind::Moved,
            format!("{} → {}", source.name, target.name),
        )
        .await;
        if !same_column {
            self.notify(
                tenant_id,
                &moved.assignee_ids(),
                Some(actor.id),
                NotificationKind::Moved,
                &moved,
                format!("{} moved it to {}", actor.name, target.name),
            )
            .await;
        }
        if source.is_completed != target.is_completed {
            self.rollup(tenant_id, &[moved.work_order_id]).await;
        }
        if became_complete && moved.recurrence.is_some() {
            if let Err(e) = self.spawn_recurrence(actor, &moved).await {
                tracing::error!(task_id = id, "Failed to create next occurrence: {}", e);
            }
        }

        self.realtime.publish(
            tenant_id,
            Room::Tenant,
            "task.moved",
            &serde_json::json!({
                "task": moved.clone().into_dto(),
                "from_column_id": source.id,
                "to_column_id": target.id,
            }),
        );

        Ok(moved)
    }

    /// Creates the next occurrence of a completed recurring task.
    ///
    /// The copy lands at the end of the first open column with its dates shifted by one
    /// interval. The completed task's recurrence is cleared so completing it again does not
    /// spawn duplicates.
    ///
    /// # Returns
    /// - `Ok(Some(Task))` - The new occurrence
    /// - `Ok(None)` - Not recurring, or the board has no open column
    pub async fn spawn_recurrence(
        &self,
        actor: &Personnel,
        completed: &Task,
    ) -> Result<Option<Task>, AppError> {
        let tenant_id = actor.tenant_id;
        let Some(recurrence) = completed.recurrence else {
            return Ok(None);
        };

        let Some(column) = StatusRepository::new(self.db)
            .get_all(tenant_id)
            .await?
            .into_iter()
            .find(|s| !s.is_completed)
        else {
            tracing::warn!(
                task_id = completed.id,
                "No open column for the next occurrence"
            );
            return Ok(None);
        };

        let shift = |at: Option<chrono::DateTime<Utc>>| {
            at.map(|at| shift_by_recurrence(at, recurrence)).transpose()
        };
        let params = CreateTaskParams {
            title: completed.title.clone(),
            description: completed.description.clone(),
            column_id: Some(column.id),
            priority: completed.priority,
            work_order_id: completed.work_order_id,
            client_id: completed.client_id,
            start_at: shift(completed.start_at)?,
            due_at: shift(completed.due_at)?,
            estimated_hours: completed.estimated_hours,
            recurrence: Some(recurrence),
            reminder_at: shift(completed.reminder_at)?,
            assignee_ids: completed.assignee_ids(),
        };

        let task_repo = TaskRepository::new(self.db);
        let position = task_repo.count_in_column(column.id).await? as i32;
        let created = task_repo
            .create(
                tenant_id,
                column.id,
                position,
                params,
                None,
                completed.created_by,
            )
            .await?;
        TaskAssigneeRepository::new(self.db)
            .add(created.id, &completed.assignee_ids())
            .await?;
        task_repo.set_recurrence(completed.id, None).await?;
        let next = self.get(tenant_id, created.id).await?;

        self.log_timeline(
            tenant_id,
            next.id,
            Some(actor.id),
            TimelineKind::Recurred,
            format!("Next {} occurrence of task #{}", recurrence, completed.id),
        )
        .await;
        self.rollup(tenant_id, &[next.work_order_id]).await;

        tracing::info!(
            tenant_id,
            task_id = completed.id,
            next_id = next.id,
            "Recurring task rescheduled"
        );
        self.realtime
            .publish(tenant_id, Room::Tenant, "task.created", &next.clone().into_dto());

        Ok(Some(next))
    }

    /// Replaces a task's assignees.
    ///
    /// # Returns
    /// - `Ok(Task)` - The task with its new assignees
    /// - `Err(AppError::BadRequest)` - An id is not personnel of the tenant
    pub async fn set_assignees(
        &self,
        actor: &Personnel,
        id: i32,
        personnel_ids: &[i32],
    ) -> Result<Task, AppError> {
        let tenant_id = actor.tenant_id;
        let task = self.get(tenant_id, id).await?;
        let personnel_service = PersonnelService::new(self.db, self.realtime);
        let wanted = personnel_service.resolve(tenant_id, personnel_ids).await?;

        let current = task.assignee_ids();
        let added: Vec<&Personnel> = wanted.iter().filter(|p| !current.contains(&p.id)).collect();
        let removed: Vec<i32> = current
            .iter()
            .copied()
            .filter(|pid| !wanted.iter().any(|p| p.id == *pid))
            .collect();

        let assignee_repo = TaskAssigneeRepository::new(self.db);
        assignee_repo.remove(&[id], &removed).await?;
        let added_ids: Vec<i32> = added.iter().map(|p| p.id).collect();
        assignee_repo.add(id, &added_ids).await?;

        for person in &added {
            self.log_timeline(
                tenant_id,
                id,
                Some(actor.id),
                TimelineKind::Assigned,
                format!("Assigned {}", person.name),
            )
            .await;
        }
        for summary in task.assignees.iter().filter(|a| removed.contains(&a.personnel_id)) {
            self.log_timeline(
                tenant_id,
                id,
                Some(actor.id),
                TimelineKind::Unassigned,
                format!("Unassigned {}", summary.name),
            )
            .await;
        }

        let updated = self.get(tenant_id, id).await?;
        self.notify(
            tenant_id,
            &added_ids,
            Some(actor.id),
            NotificationKind::Assigned,
            &updated,
            format!("{} assigned you to \"{}\"", actor.name, updated.title),
        )
        .await;

        let dto = updated.clone().into_dto();
        self.realtime
            .publish(tenant_id, Room::Tenant, "task.updated", &dto);
        self.realtime
            .publish(tenant_id, Room::Task(id), "task.updated", &dto);

        Ok(updated)
    }

    /// Adds a comment to a task's timeline and notifies the other assignees.
    pub async fn comment(
        &self,
        actor: &Personnel,
        id: i32,
        message: &str,
    ) -> Result<TimelineEntry, AppError> {
        let tenant_id = actor.tenant_id;
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::BadRequest("Comment cannot be empty".to_string()));
        }
        let task = self.get(tenant_id, id).await?;

        let row = TimelineRepository::new(self.db)
            .create(
                tenant_id,
                id,
                Some(actor.id),
                TimelineKind::Comment,
                message.to_string(),
            )
            .await?;
        let entry = TimelineEntry::from_entity(row, Some(actor.name.clone()))?;

        self.notify(
            tenant_id,
            &task.assignee_ids(),
            Some(actor.id),
            NotificationKind::Comment,
            &task,
            format!("{}: {}", actor.name, message),
        )
        .await;
        self.realtime.publish(
            tenant_id,
            Room::Task(id),
            "timeline.appended",
            &entry.clone().into_dto(),
        );

        Ok(entry)
    }
}
