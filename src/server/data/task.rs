//! Task data repository.
//!
//! Tasks returned from this repository carry their assignee summaries, work order title
//! and client name. Those are loaded in batches per call rather than per task.
//!
//! Technician visibility is expressed as a query condition: a task is visible to a
//! personnel record when they are an assignee or are on the crew of the task's work order.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

use crate::{
    model::task::Recurrence,
    server::model::{
        personnel::PersonnelSummary,
        task::{CreateTaskParams, Task, TaskFilter, UpdateTaskParams},
    },
};

pub struct TaskRepository<'a> {
    db: &'a DatabaseConnection,
}

/// Tasks assigned to `personnel_id` directly or through their work order crew.
pub fn visible_to(personnel_id: i32) -> Condition {
    Condition::any()
        .add(
            entity::task::Column::Id.in_subquery(
                Query::select()
                    .column(entity::task_assignee::Column::TaskId)
                    .from(entity::task_assignee::Entity)
                    .and_where(entity::task_assignee::Column::PersonnelId.eq(personnel_id))
                    .to_owned(),
            ),
        )
        .add(
            entity::task::Column::WorkOrderId.in_subquery(
                Query::select()
                    .column(entity::work_order_personnel::Column::WorkOrderId)
                    .from(entity::work_order_personnel::Entity)
                    .and_where(
                        entity::work_order_personnel::Column::PersonnelId.eq(personnel_id),
                    )
                    .to_owned(),
            ),
        )
}

fn apply_filter(
    mut query: Select<entity::task::Entity>,
    filter: &TaskFilter,
    viewer: Option<i32>,
) -> Select<entity::task::Entity> {
    if let Some(personnel_id) = viewer {
        query = query.filter(visible_to(personnel_id));
    }
    if let Some(work_order_id) = filter.work_order_id {
        query = query.filter(entity::task::Column::WorkOrderId.eq(work_order_id));
    }
    if let Some(client_id) = filter.client_id {
        query = query.filter(entity::task::Column::ClientId.eq(client_id));
    }
    if let Some(assignee_id) = filter.assignee_id {
        query = query.filter(
            entity::task::Column::Id.in_subquery(
                Query::select()
                    .column(entity::task_assignee::Column::TaskId)
                    .from(entity::task_assignee::Entity)
                    .and_where(entity::task_assignee::Column::PersonnelId.eq(assignee_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        query = query.filter(entity::task::Column::Title.contains(search));
    }
    query
}

impl<'a> TaskRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Converts rows to domain tasks and attaches assignees, work order titles and client
    /// names using one query per relation.
    async fn with_details(&self, entities: Vec<entity::task::Model>) -> Result<Vec<Task>, DbErr> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let task_ids: Vec<i32> = entities.iter().map(|t| t.id).collect();
        let assignee_rows = entity::prelude::TaskAssignee::find()
            .filter(entity::task_assignee::Column::TaskId.is_in(task_ids))
            .order_by_asc(entity::task_assignee::Column::Id)
            .all(self.db)
            .await?;

        let personnel_ids: HashSet<i32> = assignee_rows.iter().map(|a| a.personnel_id).collect();
        let names: HashMap<i32, String> = if personnel_ids.is_empty() {
            HashMap::new()
        } else {
            entity::prelude::Personnel::find()
                .filter(entity::personnel::Column::Id.is_in(personnel_ids))
                .find_also_related(entity::prelude::User)
                .all(self.db)
                .await?
                .into_iter()
                .filter_map(|(p, u)| u.map(|u| (p.id, u.name)))
                .collect()
        };

        let work_order_ids: HashSet<i32> =
            entities.iter().filter_map(|t| t.work_order_id).collect();
        let work_order_titles: HashMap<i32, String> = if work_order_ids.is_empty() {
            HashMap::new()
        } else {
            entity::prelude::WorkOrder::find()
                .filter(entity::work_order::Column::Id.is_in(work_order_ids))
                .all(self.db)
                .await?
                .into_iter()
                .map(|w| (w.id, w.title))
                .collect()
        };

        let client_ids: HashSet<i32> = entities.iter().filter_map(|t| t.client_id).collect();
        let client_names: HashMap<i32, String> = if client_ids.is_empty() {
            HashMap::new()
        } else {
            entity::prelude::Client::find()
                .filter(entity::client::Column::Id.is_in(client_ids))
                .all(self.db)
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect()
        };

        let mut assignees: HashMap<i32, Vec<PersonnelSummary>> = HashMap::new();
        for row in assignee_rows {
            if let Some(name) = names.get(&row.personnel_id) {
                assignees.entry(row.task_id).or_default().push(PersonnelSummary {
                    personnel_id: row.personnel_id,
                    name: name.clone(),
                });
            }
        }

        entities
            .into_iter()
            .map(|entity| {
                let mut task = Task::from_entity(entity)?;
                task.assignees = assignees.remove(&task.id).unwrap_or_default();
                task.work_order_title = task
                    .work_order_id
                    .and_then(|id| work_order_titles.get(&id).cloned());
                task.client_name = task.client_id.and_then(|id| client_names.get(&id).cloned());
                Ok(task)
            })
            .collect()
    }

    /// Creates a task at the given column and position.
    ///
    /// Positions of other tasks are not touched; callers append at the column's end.
    ///
    /// # Returns
    /// - `Ok(Task)` - The created task without assignees
    /// - `Err(DbErr)` - Insert failed
    pub async fn create(
        &self,
        tenant_id: i32,
        column_id: i32,
        position: i32,
        params: CreateTaskParams,
        completed_at: Option<DateTime<Utc>>,
        created_by: Option<i32>,
    ) -> Result<Task, DbErr> {
        let now = Utc::now();
        let entity = entity::task::ActiveModel {
            tenant_id: ActiveValue::Set(tenant_id),
            column_id: ActiveValue::Set(column_id),
            position: ActiveValue::Set(position),
            title: ActiveValue::Set(params.title),
            description: ActiveValue::Set(params.description),
            priority: ActiveValue::Set(params.priority.to_string()),
            work_order_id: ActiveValue::Set(params.work_order_id),
            client_id: ActiveValue::Set(params.client_id),
            start_at: ActiveValue::Set(params.start_at),
            due_at: ActiveValue::Set(params.due_at),
            estimated_hours: ActiveValue::Set(params.estimated_hours),
            recurrence: ActiveValue::Set(params.recurrence.map(|r| r.to_string())),
            reminder_at: ActiveValue::Set(params.reminder_at),
            reminder_sent: ActiveValue::Set(false),
            completed_at: ActiveValue::Set(completed_at),
            created_by: ActiveValue::Set(created_by),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Task::from_entity(entity)
    }

    /// Finds a task with details by id within a tenant.
    ///
    /// # Returns
    /// - `Ok(Some(Task))` - Found in the tenant
    /// - `Ok(None)` - Missing or owned by another tenant
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_id(&self, tenant_id: i32, id: i32) -> Result<Option<Task>, DbErr> {
        let entity = entity::prelude::Task::find_by_id(id)
            .filter(entity::task::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;

        match entity {
            Some(entity) => Ok(self.with_details(vec![entity]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Whether `personnel_id` may see the task without a manager role.
    pub async fn is_visible_to(&self, task_id: i32, personnel_id: i32) -> Result<bool, DbErr> {
        let count = entity::prelude::Task::find_by_id(task_id)
            .filter(visible_to(personnel_id))
            .count(self.db)
            .await?;

        Ok(count > 0)
    }

    /// Tasks for the board in column and position order.
    ///
    /// # Arguments
    /// - `viewer` - Restrict to tasks visible to this personnel id; `None` for managers
    pub async fn get_board(
        &self,
        tenant_id: i32,
        filter: &TaskFilter,
        viewer: Option<i32>,
    ) -> Result<Vec<Task>, DbErr> {
        let query =
            entity::prelude::Task::find().filter(entity::task::Column::TenantId.eq(tenant_id));
        let entities = apply_filter(query, filter, viewer)
            .order_by_asc(entity::task::Column::ColumnId)
            .order_by_asc(entity::task::Column::Position)
            .order_by_asc(entity::task::Column::Id)
            .all(self.db)
            .await?;

        self.with_details(entities).await
    }

    /// Filtered page of tasks, newest first.
    ///
    /// # Returns
    /// - `Ok((tasks, total))` - The requested page and total matching count
    /// - `Err(DbErr)` - Database error during pagination
    pub async fn get_paginated(
        &self,
        tenant_id: i32,
        filter: &TaskFilter,
        viewer: Option<i32>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Task>, u64), DbErr> {
        let query =
            entity::prelude::Task::find().filter(entity::task::Column::TenantId.eq(tenant_id));
        let paginator = apply_filter(query, filter, viewer)
            .order_by_desc(entity::task::Column::CreatedAt)
            .order_by_desc(entity::task::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let entities = paginator.fetch_page(page).await?;

        Ok((self.with_details(entities).await?, total))
    }

    /// Tasks linked to a work order in board order.
    pub async fn get_by_work_order(
        &self,
        tenant_id: i32,
        work_order_id: i32,
    ) -> Result<Vec<Task>, DbErr> {
        let filter = TaskFilter {
            work_order_id: Some(work_order_id),
            ..Default::default()
        };
        self.get_board(tenant_id, &filter, None).await
    }

    /// Tasks whose start or due date falls in `[from, to)`.
    pub async fn get_in_range(
        &self,
        tenant_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        viewer: Option<i32>,
    ) -> Result<Vec<Task>, DbErr> {
        let mut query = entity::prelude::Task::find()
            .filter(entity::task::Column::TenantId.eq(tenant_id))
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(entity::task::Column::StartAt.gte(from))
                            .add(entity::task::Column::StartAt.lt(to)),
                    )
                    .add(
                        Condition::all()
                            .add(entity::task::Column::DueAt.gte(from))
                            .add(entity::task::Column::DueAt.lt(to)),
                    ),
            );
        if let Some(personnel_id) = viewer {
            query = query.filter(visible_to(personnel_id));
        }

        let entities = query.all(self.db).await?;
        self.with_details(entities).await
    }

    /// Ids of the tasks in a column in position order.
    pub async fn get_column_task_ids(&self, column_id: i32) -> Result<Vec<i32>, DbErr> {
        entity::prelude::Task::find()
            .select_only()
            .column(entity::task::Column::Id)
            .filter(entity::task::Column::ColumnId.eq(column_id))
            .order_by_asc(entity::task::Column::Position)
            .order_by_asc(entity::task::Column::Id)
            .into_tuple()
            .all(self.db)
            .await
    }

    pub async fn count_in_column(&self, column_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Task::find()
            .filter(entity::task::Column::ColumnId.eq(column_id))
            .count(self.db)
            .await
    }

    /// Applies a partial update.
    ///
    /// # Arguments
    /// - `reset_reminder` - Clear `reminder_sent` because `reminder_at` changed
    ///
    /// # Returns
    /// - `Ok(())` - Updated
    /// - `Err(DbErr::RecordNotFound)` - No task with that id
    pub async fn update(
        &self,
        id: i32,
        params: UpdateTaskParams,
        reset_reminder: bool,
    ) -> Result<(), DbErr> {
        let task = entity::prelude::Task::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(DbErr::RecordNotFound(format!("Task {} not found", id)))?;

        let mut active_model: entity::task::ActiveModel = task.into();
        if let Some(title) = params.title {
            active_model.title = ActiveValue::Set(title);
        }
        if let Some(description) = params.description {
            active_model.description = ActiveValue::Set(description);
        }
        if let Some(priority) = params.priority {
            active_model.priority = ActiveValue::Set(priority.to_string());
        }
        if let Some(work_order_id) = params.work_order_id {
            active_model.work_order_id = ActiveValue::Set(work_order_id);
        }
        if let Some(client_id) = params.client_id {
            active_model.client_id = ActiveValue::Set(client_id);
        }
        if let Some(start_at) = params.start_at {
            active_model.start_at = ActiveValue::Set(start_at);
        }
        if let Some(due_at) = params.due_at {
            active_model.due_at = ActiveValue::Set(due_at);
        }
        if let Some(estimated_hours) = params.estimated_hours {
            active_model.estimated_hours = ActiveValue::Set(estimated_hours);
        }
        if let Some(recurrence) = params.recurrence {
            active_model.recurrence = ActiveValue::Set(recurrence.map(|r| r.to_string()));
        }
        if let Some(reminder_at) = params.reminder_at {
            active_model.reminder_at = ActiveValue::Set(reminder_at);
        }
        if reset_reminder {
            active_model.reminder_sent = ActiveValue::Set(false);
        }
        active_model.updated_at = ActiveValue::Set(Utc::now());
        active_model.update(self.db).await?;

        Ok(())
    }

    /// Moves `ids` into `column_id` at positions `0..n` in slice order.
    pub async fn place(&self, column_id: i32, ids: &[i32]) -> Result<(), DbErr> {
        for (position, id) in ids.iter().enumerate() {
            entity::prelude::Task::update_many()
                .filter(entity::task::Column::Id.eq(*id))
                .col_expr(entity::task::Column::ColumnId, Expr::value(column_id))
                .col_expr(entity::task::Column::Position, Expr::value(position as i32))
                .exec(self.db)
                .await?;
        }
        Ok(())
    }

    pub async fn set_completed_at(
        &self,
        id: i32,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), DbErr> {
        entity::prelude::Task::update_many()
            .filter(entity::task::Column::Id.eq(id))
            .col_expr(entity::task::Column::CompletedAt, Expr::value(completed_at))
            .col_expr(entity::task::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Makes `completed_at` agree with the column's completion flag.
    ///
    /// Tasks already completed keep their original timestamp.
    pub async fn sync_column_completion(
        &self,
        column_id: i32,
        is_completed: bool,
        now: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let update = entity::prelude::Task::update_many()
            .filter(entity::task::Column::ColumnId.eq(column_id));
        let result = if is_completed {
            update
                .filter(entity::task::Column::CompletedAt.is_null())
                .col_expr(entity::task::Column::CompletedAt, Expr::value(now))
                .exec(self.db)
                .await?
        } else {
            update
                .filter(entity::task::Column::CompletedAt.is_not_null())
                .col_expr(
                    entity::task::Column::CompletedAt,
                    Expr::value(Option::<DateTime<Utc>>::None),
                )
                .exec(self.db)
                .await?
        };
        Ok(result.rows_affected)
    }

    pub async fn set_recurrence(
        &self,
        id: i32,
        recurrence: Option<Recurrence>,
    ) -> Result<(), DbErr> {
        entity::prelude::Task::update_many()
            .filter(entity::task::Column::Id.eq(id))
            .col_expr(
                entity::task::Column::Recurrence,
                Expr::value(recurrence.map(|r| r.to_string())),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// `(total, completed)` counts of the tasks linked to a work order.
    pub async fn completion_counts(&self, work_order_id: i32) -> Result<(i32, i32), DbErr> {
        let total = entity::prelude::Task::find()
            .filter(entity::task::Column::WorkOrderId.eq(work_order_id))
            .count(self.db)
            .await?;
        let completed = entity::prelude::Task::find()
            .filter(entity::task::Column::WorkOrderId.eq(work_order_id))
            .filter(entity::task::Column::CompletedAt.is_not_null())
            .count(self.db)
            .await?;

        Ok((total as i32, completed as i32))
    }

    /// Distinct work orders linked to tasks in a column.
    pub async fn get_work_order_ids_in_column(&self, column_id: i32) -> Result<Vec<i32>, DbErr> {
        let ids: Vec<Option<i32>> = entity::prelude::Task::find()
            .select_only()
            .column(entity::task::Column::WorkOrderId)
            .distinct()
            .filter(entity::task::Column::ColumnId.eq(column_id))
            .filter(entity::task::Column::WorkOrderId.is_not_null())
            .into_tuple()
            .all(self.db)
            .await?;

        Ok(ids.into_iter().flatten().collect())
    }

    /// Ids of the tasks linked to a work order.
    pub async fn get_ids_by_work_order(&self, work_order_id: i32) -> Result<Vec<i32>, DbErr> {
        entity::prelude::Task::find()
            .select_only()
            .column(entity::task::Column::Id)
            .filter(entity::task::Column::WorkOrderId.eq(work_order_id))
            .order_by_asc(entity::task::Column::Id)
            .into_tuple()
            .all(self.db)
            .await
    }

    /// Clears `client_id` on every task linked to the client.
    pub async fn unlink_client(&self, client_id: i32) -> Result<u64, DbErr> {
        let result = entity::prelude::Task::update_many()
            .filter(entity::task::Column::ClientId.eq(client_id))
            .col_expr(
                entity::task::Column::ClientId,
                Expr::value(Option::<i32>::None),
            )
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Open tasks across all tenants whose reminder time has passed and was not yet sent.
    pub async fn get_due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Task>, DbErr> {
        let entities = entity::prelude::Task::find()
            .filter(entity::task::Column::ReminderAt.lte(now))
            .filter(entity::task::Column::ReminderSent.eq(false))
            .filter(entity::task::Column::CompletedAt.is_null())
            .order_by_asc(entity::task::Column::ReminderAt)
            .all(self.db)
            .await?;

        self.with_details(entities).await
    }

    pub async fn mark_reminder_sent(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Task::update_many()
            .filter(entity::task::Column::Id.eq(id))
            .col_expr(entity::task::Column::ReminderSent, Expr::value(true))
            .exec(self.db)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::Task::delete_by_id(id).exec(self.db).await?;

        Ok(())
    }
}
