//! Check-in session repository.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder,
};

use crate::{
    model::check_in::CheckInEndReason,
    server::model::check_in::{CheckIn, CheckInFilter, StartCheckInParams},
};

pub struct CheckInRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CheckInRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a session with its first heartbeat at `now`.
    pub async fn create(
        &self,
        tenant_id: i32,
        personnel_id: i32,
        params: StartCheckInParams,
        now: DateTime<Utc>,
    ) -> Result<CheckIn, DbErr> {
        let entity = entity::check_in_session::ActiveModel {
            tenant_id: ActiveValue::Set(tenant_id),
            personnel_id: ActiveValue::Set(personnel_id),
            work_order_id: ActiveValue::Set(params.work_order_id),
            task_id: ActiveValue::Set(params.task_id),
            note: ActiveValue::Set(params.note),
            started_at: ActiveValue::Set(now),
            last_heartbeat_at: ActiveValue::Set(now),
            ended_at: ActiveValue::Set(None),
            end_reason: ActiveValue::Set(None),
            duration_minutes: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        CheckIn::from_entity(entity)
    }

    pub async fn find_by_id(&self, tenant_id: i32, id: i32) -> Result<Option<CheckIn>, DbErr> {
        entity::prelude::CheckInSession::find_by_id(id)
            .filter(entity::check_in_session::Column::TenantId.eq(tenant_id))
            .one(self.db)
            .await?
            .map(CheckIn::from_entity)
            .transpose()
    }

    /// The open session of a personnel record, if any.
    pub async fn find_open_by_personnel(
        &self,
        personnel_id: i32,
    ) -> Result<Option<CheckIn>, DbErr> {
        entity::prelude::CheckInSession::find()
            .filter(entity::check_in_session::Column::PersonnelId.eq(personnel_id))
            .filter(entity::check_in_session::Column::EndedAt.is_null())
            .one(self.db)
            .await?
            .map(CheckIn::from_entity)
            .transpose()
    }

    /// Sessions of a tenant matching the filter, newest first.
    ///
    /// `from` and `to` bound `started_at`.
    pub async fn get_filtered(
        &self,
        tenant_id: i32,
        filter: &CheckInFilter,
    ) -> Result<Vec<CheckIn>, DbErr> {
        let mut query = entity::prelude::CheckInSession::find()
            .filter(entity::check_in_session::Column::TenantId.eq(tenant_id));
        if let Some(personnel_id) = filter.personnel_id {
            query = query.filter(entity::check_in_session::Column::PersonnelId.eq(personnel_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(entity::check_in_session::Column::StartedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(entity::check_in_session::Column::StartedAt.lt(to));
        }

        query
            .order_by_desc(entity::check_in_session::Column::StartedAt)
            .order_by_desc(entity::check_in_session::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(CheckIn::from_entity)
            .collect()
    }

    /// Open sessions with no heartbeat since `cutoff`, across all tenants.
    pub async fn get_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<CheckIn>, DbErr> {
        entity::prelude::CheckInSession::find()
            .filter(entity::check_in_session::Column::EndedAt.is_null())
            .filter(entity::check_in_session::Column::LastHeartbeatAt.lt(cutoff))
            .all(self.db)
            .await?
            .into_iter()
            .map(CheckIn::from_entity)
            .collect()
    }

    /// Open sessions logged against a work order.
    pub async fn get_open_by_work_order(&self, work_order_id: i32) -> Result<Vec<CheckIn>, DbErr> {
        entity::prelude::CheckInSession::find()
            .filter(entity::check_in_session::Column::WorkOrderId.eq(work_order_id))
            .filter(entity::check_in_session::Column::EndedAt.is_null())
            .all(self.db)
            .await?
            .into_iter()
            .map(CheckIn::from_entity)
            .collect()
    }

    pub async fn heartbeat(&self, id: i32, now: DateTime<Utc>) -> Result<(), DbErr> {
        entity::prelude::CheckInSession::update_many()
            .filter(entity::check_in_session::Column::Id.eq(id))
            .col_expr(
                entity::check_in_session::Column::LastHeartbeatAt,
                Expr::value(now),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Closes an open session.
    ///
    /// # Returns
    /// - `Ok(true)` - The session was open and is now closed
    /// - `Ok(false)` - The session was already closed
    /// - `Err(DbErr)` - Database error
    pub async fn close(
        &self,
        id: i32,
        ended_at: DateTime<Utc>,
        reason: CheckInEndReason,
        duration_minutes: i32,
    ) -> Result<bool, DbErr> {
        let result = entity::prelude::CheckInSession::update_many()
            .filter(entity::check_in_session::Column::Id.eq(id))
            .filter(entity::check_in_session::Column::EndedAt.is_null())
            .col_expr(entity::check_in_session::Column::EndedAt, Expr::value(ended_at))
            .col_expr(
                entity::check_in_session::Column::EndReason,
                Expr::value(reason.to_string()),
            )
            .col_expr(
                entity::check_in_session::Column::DurationMinutes,
                Expr::value(duration_minutes),
            )
            .exec(self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }
}
