//! Work order data repository.
//!
//! Like tasks, work orders are returned with their crew summaries and client name
//! attached. Technicians only see work orders whose crew they are on.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::{
    model::work_order::WorkOrderStatus,
    server::model::{
        personnel::PersonnelSummary,
        work_order::{
            CreateWorkOrderParams, Rollup, UpdateWorkOrderParams, WorkOrder, WorkOrderFilter,
        },
    },
};

pub struct WorkOrderRepository<'a> {
    db: &'a DatabaseConnection,
}

fn crew_of(personnel_id: i32) -> Condition {
    Condition::all().add(
        entity::work_order::Column::Id.in_subquery(
            Query::select()
                .column(entity::work_order_personnel::Column::WorkOrderId)
                .from(entity::work_order_personnel::Entity)
                .and_where(entity::work_order_personnel::Column::PersonnelId.eq(personnel_id))
                .to_owned(),
        ),
    )
}

impl<'a> WorkOrderRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_details(
        &self,
        entities: Vec<entity::work_order::Model>,
    ) -> Result<Vec<WorkOrder>, DbErr> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = entities.iter().map(|w| w.id).collect();
        let crew_rows = entity::prelude::WorkOrderPersonnel::find()
            .filter(entity::work_order_personnel::Column::WorkOrderId.is_in(ids))
            .order_by_asc(entity::work_order_personnel::Column::Id)
            .all(self.db)
            .await?;

        let personnel_ids: HashSet<i32> = crew_rows.iter().map(|c| c.personnel_id).collect();
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

        let client_ids: HashSet<i32> = entities.iter().filter_map(|w| w.client_id).collect();
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

        let mut crews: HashMap<i32, Vec<PersonnelSummary>> = HashMap::new();
        for row in crew_rows {
            if let Some(name) = names.get(&row.personnel_id) {
                crews.entry(row.work_order_id).or_default().push(PersonnelSummary {
                    personnel_id: row.personnel_id,
                    name: name.clone(),
                });
            }
        }

        entities
            .into_iter()
            .map(|entity| {
                let mut work_order = WorkOrder::from_entity(entity)?;
                work_order.personnel = crews.remove(&work_order.id).unwrap_or_default();
                work_order.client_name = work_order
                    .client_id
                    .and_then(|id| client_names.get(&id).cloned());
                Ok(work_order)
            })
            .collect()
    }

    /// Creates a pending work order with zeroed rollup fields.
    ///
    /// # Returns
    /// - `Ok(WorkOrder)` - The created work order without crew
    /// - `Err(DbErr)` - Insert failed
    pub async fn create(
        &self,
        tenant_id: i32,
        params: &CreateWorkOrderParams,
        created_by: Option<i32>,
    ) -> Result<WorkOrder, DbErr> {
        let now = Utc::now();
        let entity = entity::work_order::ActiveModel {
            tenant_id: ActiveValue::Set(tenant_id),
            client_id: ActiveValue::Set(params.client_id),
            title: ActiveValue::Set(params.title.clone()),
            description: ActiveValue::Set(params.description.clone()),
            status: ActiveValue::Set(WorkOrderStatus::Pending.to_string()),
            priority: ActiveValue::Set(params.priority.to_string()),
            scheduled_at: ActiveValue::Set(params.scheduled_at),
            due_at: ActiveValue::Set(params.due_at),
            progress: ActiveValue::Set(0),
            task_count: ActiveValue::Set(0),
            completed_task_count: ActiveValue::Set(0),
            created_by: ActiveValue::Set(created_by),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        WorkOrder::from_entity(entity)
    }

    /// Finds a work order with crew by id within a tenant.
    ///
    /// # Returns
    /// - `Ok(Some(WorkOrder))` - Found in the tenant
    /// - `Ok(None)` - Missing or owned by another tenant
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_id(&self, tenant_id: i32, id: i32) -> Result<Option<WorkOrder>, DbErr> {
        let entity = entity::prelude::WorkOrder::find_by_id(id)
            .filter(entity::work_order::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?;

        match entity {
            Some(entity) => Ok(self.with_details(vec![entity]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Filtered page of work orders, newest first.
    ///
    /// # Arguments
    /// - `viewer` - Restrict to work orders whose crew includes this personnel id
    ///
    /// # Returns
    /// - `Ok((work_orders, total))` - The requested page and total matching count
    /// - `Err(DbErr)` - Database error during pagination
    pub async fn get_paginated(
        &self,
        tenant_id: i32,
        filter: &WorkOrderFilter,
        viewer: Option<i32>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<WorkOrder>, u64), DbErr> {
        let mut query = entity::prelude::WorkOrder::find()
            .filter(entity::work_order::Column::TenantId.eq(tenant_id));
        if let Some(personnel_id) = viewer {
            query = query.filter(crew_of(personnel_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(entity::work_order::Column::Status.eq(status.to_string()));
        }
        if let Some(client_id) = filter.client_id {
            query = query.filter(entity::work_order::Column::ClientId.eq(client_id));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(entity::work_order::Column::Title.contains(search));
        }

        let paginator = query
            .order_by_desc(entity::work_order::Column::CreatedAt)
            .order_by_desc(entity::work_order::Column::Id)
            .paginate(self.db, per_page);

        let total = paginator.num_items().await?;
        let entities = paginator.fetch_page(page).await?;

        Ok((self.with_details(entities).await?, total))
    }

    /// All work orders of the tenant without crew details, used for title resolution.
    pub async fn get_all(&self, tenant_id: i32) -> Result<Vec<WorkOrder>, DbErr> {
        entity::prelude::WorkOrder::find()
            .filter(entity::work_order::Column::TenantId.eq(tenant_id))
            .order_by_asc(entity::work_order::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(WorkOrder::from_entity)
            .collect()
    }

    /// Work orders whose scheduled or due date falls in `[from, to)`.
    pub async fn get_in_range(
        &self,
        tenant_id: i32,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        viewer: Option<i32>,
    ) -> Result<Vec<WorkOrder>, DbErr> {
        let mut query = entity::prelude::WorkOrder::find()
            .filter(entity::work_order::Column::TenantId.eq(tenant_id))
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(entity::work_order::Column::ScheduledAt.gte(from))
                            .add(entity::work_order::Column::ScheduledAt.lt(to)),
                    )
                    .add(
                        Condition::all()
                            .add(entity::work_order::Column::DueAt.gte(from))
                            .add(entity::work_order::Column::DueAt.lt(to)),
                    ),
            );
        if let Some(personnel_id) = viewer {
            query = query.filter(crew_of(personnel_id));
        }

        let entities = query.all(self.db).await?;
        entities.into_iter().map(WorkOrder::from_entity).collect()
    }

    /// Applies a partial update. Rollup fields are not touched.
    ///
    /// # Returns
    /// - `Ok(())` - Updated
    /// - `Err(DbErr::RecordNotFound)` - No work order with that id
    pub async fn update(&self, id: i32, params: UpdateWorkOrderParams) -> Result<(), DbErr> {
        let work_order = entity::prelude::WorkOrder::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(DbErr::RecordNotFound(format!("Work order {} not found", id)))?;

        let mut active_model: entity::work_order::ActiveModel = work_order.into();
        if let Some(title) = params.title {
            active_model.title = ActiveValue::Set(title);
        }
        if let Some(description) = params.description {
            active_model.description = ActiveValue::Set(description);
        }
        if let Some(client_id) = params.client_id {
            active_model.client_id = ActiveValue::Set(client_id);
        }
        if let Some(priority) = params.priority {
            active_model.priority = ActiveValue::Set(priority.to_string());
        }
        if let Some(status) = params.status {
            active_model.status = ActiveValue::Set(status.to_string());
        }
        if let Some(scheduled_at) = params.scheduled_at {
            active_model.scheduled_at = ActiveValue::Set(scheduled_at);
        }
        if let Some(due_at) = params.due_at {
            active_model.due_at = ActiveValue::Set(due_at);
        }
        active_model.updated_at = ActiveValue::Set(Utc::now());
        active_model.update(self.db).await?;

        Ok(())
    }

    /// Stores the counts, progress and status computed by a rollup.
    pub async fn apply_rollup(&self, id: i32, rollup: Rollup) -> Result<(), DbErr> {
        entity::prelude::WorkOrder::update_many()
            .filter(entity::work_order::Column::Id.eq(id))
            .col_expr(entity::work_order::Column::TaskCount, Expr::value(rollup.task_count))
            .col_expr(
                entity::work_order::Column::CompletedTaskCount,
                Expr::value(rollup.completed_task_count),
            )
            .col_expr(entity::work_order::Column::Progress, Expr::value(rollup.progress))
            .col_expr(
                entity::work_order::Column::Status,
                Expr::value(rollup.status.to_string()),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Clears `client_id` on every work order of the client.
    pub async fn unlink_client(&self, client_id: i32) -> Result<u64, DbErr> {
        let result = entity::prelude::WorkOrder::update_many()
            .filter(entity::work_order::Column::ClientId.eq(client_id))
            .col_expr(
                entity::work_order::Column::ClientId,
                Expr::value(Option::<i32>::None),
            )
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete(&self, id: i32) -> Result<(), DbErr> {
        entity::prelude::WorkOrder::delete_by_id(id)
            .exec(self.db)
            .await?;

        Ok(())
    }
}
