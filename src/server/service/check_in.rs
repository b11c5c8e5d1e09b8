//! Check-in sessions: one open session per personnel, kept alive by heartbeats.

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::{
    model::{check_in::CheckInEndReason, personnel::Role},
    server::{
        data::{check_in::CheckInRepository, task::TaskRepository, work_order::WorkOrderRepository},
        error::{auth::AuthError, AppError},
        model::{
            check_in::{duration_minutes, CheckIn, CheckInFilter, StartCheckInParams},
            personnel::Personnel,
        },
        realtime::{RealtimeHub, Room},
    },
};

pub struct CheckInService<'a> {
    db: &'a DatabaseConnection,
    realtime: &'a RealtimeHub,
}

impl<'a> CheckInService<'a> {
    pub fn new(db: &'a DatabaseConnection, realtime: &'a RealtimeHub) -> Self {
        Self { db, realtime }
    }

    async fn get(&self, tenant_id: i32, id: i32) -> Result<CheckIn, AppError> {
        CheckInRepository::new(self.db)
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Check-in not found".to_string()))
    }

    fn publish(&self, event: &str, check_in: &CheckIn) {
        self.realtime.publish(
            check_in.tenant_id,
            Room::Tenant,
            event,
            &check_in.clone().into_dto(),
        );
    }

    /// Opens a session for `actor`.
    ///
    /// # Returns
    /// - `Ok(CheckIn)` - The open session
    /// - `Err(AppError::Conflict)` - The actor already has an open session
    /// - `Err(AppError::BadRequest)` - Work order or task outside the tenant
    pub async fn start(
        &self,
        actor: &Personnel,
        params: StartCheckInParams,
    ) -> Result<CheckIn, AppError> {
        let tenant_id = actor.tenant_id;
        let repo = CheckInRepository::new(self.db);
        if repo.find_open_by_personnel(actor.id).await?.is_some() {
            return Err(AppError::Conflict(
                "Already checked in; check out first".to_string(),
            ));
        }

        if let Some(work_order_id) = params.work_order_id {
            WorkOrderRepository::new(self.db)
                .find_by_id(tenant_id, work_order_id)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown work order {}", work_order_id))
                })?;
        }
        if let Some(task_id) = params.task_id {
            TaskRepository::new(self.db)
                .find_by_id(tenant_id, task_id)
                .await?
                .ok_or_else(|| AppError::BadRequest(format!("Unknown task {}", task_id)))?;
        }

        let check_in = repo.create(tenant_id, actor.id, params, Utc::now()).await?;

        tracing::info!(tenant_id, personnel_id = actor.id, check_in_id = check_in.id, "Checked in");
        self.publish("check_in.started", &check_in);

        Ok(check_in)
    }

    /// Refreshes `last_heartbeat_at` on the actor's own open session.
    ///
    /// # Returns
    /// - `Ok(CheckIn)` - The refreshed session
    /// - `Err(AuthError::AccessDenied)` - Session belongs to someone else
    /// - `Err(AppError::Conflict)` - Session already closed
    pub async fn heartbeat(&self, actor: &Personnel, id: i32) -> Result<CheckIn, AppError> {
        let check_in = self.get(actor.tenant_id, id).await?;
        if check_in.personnel_id != actor.id {
            return Err(AuthError::AccessDenied(
                actor.user_id,
                format!("check-in {} belongs to another member", id),
            )
            .into());
        }
        if !check_in.is_open() {
            return Err(AppError::Conflict("Check-in is already closed".to_string()));
        }

        CheckInRepository::new(self.db)
            .heartbeat(id, Utc::now())
            .await?;

        self.get(actor.tenant_id, id).await
    }

    /// Closes a session as checked out. The session's owner or a manager+ may do this.
    pub async fn check_out(&self, actor: &Personnel, id: i32) -> Result<CheckIn, AppError> {
        let check_in = self.get(actor.tenant_id, id).await?;
        if check_in.personnel_id != actor.id && actor.role < Role::Manager {
            return Err(AuthError::AccessDenied(
                actor.user_id,
                format!("check-in {} belongs to another member", id),
            )
            .into());
        }

        let now = Utc::now();
        let closed = CheckInRepository::new(self.db)
            .close(
                id,
                now,
                CheckInEndReason::CheckedOut,
                duration_minutes(check_in.started_at, now),
            )
            .await?;
        if !closed {
            return Err(AppError::Conflict("Check-in is already closed".to_string()));
        }

        let check_in = self.get(actor.tenant_id, id).await?;
        tracing::info!(
            tenant_id = actor.tenant_id,
            check_in_id = id,
            minutes = check_in.duration_minutes,
            "Checked out"
        );
        self.publish("check_in.ended", &check_in);

        Ok(check_in)
    }

    pub async fn active(&self, actor: &Personnel) -> Result<Option<CheckIn>, AppError> {
        Ok(CheckInRepository::new(self.db)
            .find_open_by_personnel(actor.id)
            .await?)
    }

    /// Sessions matching `filter`; members below manager only ever see their own.
    pub async fn list(
        &self,
        actor: &Personnel,
        mut filter: CheckInFilter,
    ) -> Result<Vec<CheckIn>, AppError> {
        if actor.role < Role::Manager {
            filter.personnel_id = Some(actor.id);
        }

        Ok(CheckInRepository::new(self.db)
            .get_filtered(actor.tenant_id, &filter)
            .await?)
    }

    /// Closes every session without a heartbeat for `stale_after`.
    ///
    /// The end time is the last heartbeat, not now, so idle time is not billed.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of sessions closed
    pub async fn close_stale(
        &self,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) -> Result<u64, AppError> {
        let repo = CheckInRepository::new(self.db);
        let mut closed = 0;

        for check_in in repo.get_stale(now - stale_after).await? {
            let ended_at = check_in.last_heartbeat_at;
            if repo
                .close(
                    check_in.id,
                    ended_at,
                    CheckInEndReason::Stale,
                    duration_minutes(check_in.started_at, ended_at),
                )
                .await?
            {
                closed += 1;
                tracing::info!(
                    tenant_id = check_in.tenant_id,
                    check_in_id = check_in.id,
                    "Closed stale check-in"
                );
                let closed_session = CheckIn {
                    ended_at: Some(ended_at),
                    end_reason: Some(CheckInEndReason::Stale),
                    duration_minutes: Some(duration_minutes(check_in.started_at, ended_at)),
                    ..check_in
                };
                self.publish("check_in.ended", &closed_session);
            }
        }

        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::data::personnel::PersonnelRepository;
    use test_utils::{builder::TestBuilder, factory};

    async fn personnel(
        db: &DatabaseConnection,
        tenant_id: i32,
        id: i32,
    ) -> Result<Personnel, AppError> {
        Ok(PersonnelRepository::new(db)
            .find_by_id(tenant_id, id)
            .await?
            .unwrap())
    }

    /// Tests opening a second session while one is open.
    ///
    /// Expected: Err(AppError::Conflict)
    #[tokio::test]
    async fn start_rejects_second_open_session() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member_with_role(db, "technician").await?;
        let actor = personnel(db, member.tenant.id, member.personnel.id).await?;
        let service = CheckInService::new(db, &realtime);

        let first = service.start(&actor, StartCheckInParams::default()).await?;
        assert!(first.is_open());

        let second = service.start(&actor, StartCheckInParams::default()).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));

        Ok(())
    }

    /// Tests referencing another tenant's work order.
    ///
    /// Expected: Err(AppError::BadRequest)
    #[tokio::test]
    async fn start_rejects_foreign_work_order() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let actor = personnel(db, member.tenant.id, member.personnel.id).await?;
        let other = factory::create_tenant(db).await?;
        let foreign = factory::create_work_order(db, other.id).await?;

        let result = CheckInService::new(db, &realtime)
            .start(
                &actor,
                StartCheckInParams {
                    work_order_id: Some(foreign.id),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));

        Ok(())
    }

    /// Tests heartbeats from a different member and on a closed session.
    ///
    /// Expected: AccessDenied for the other member, Conflict once closed
    #[tokio::test]
    async fn heartbeat_requires_open_own_session() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member_with_role(db, "technician").await?;
        let actor = personnel(db, member.tenant.id, member.personnel.id).await?;
        let (_, other) =
            factory::helpers::add_member(db, member.tenant.id, "technician").await?;
        let other = personnel(db, member.tenant.id, other.id).await?;
        let service = CheckInService::new(db, &realtime);

        let session = service.start(&actor, StartCheckInParams::default()).await?;

        let foreign = service.heartbeat(&other, session.id).await;
        assert!(matches!(
            foreign,
            Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
        ));

        service.check_out(&actor, session.id).await?;
        let closed = service.heartbeat(&actor, session.id).await;
        assert!(matches!(closed, Err(AppError::Conflict(_))));

        Ok(())
    }

    /// Tests a manager checking out a technician's session.
    ///
    /// Expected: closed as checked_out with a duration
    #[tokio::test]
    async fn manager_can_check_out_others() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member_with_role(db, "manager").await?;
        let manager = personnel(db, member.tenant.id, member.personnel.id).await?;
        let (_, tech) = factory::helpers::add_member(db, member.tenant.id, "technician").await?;
        let session = factory::check_in_session::CheckInSessionFactory::new(
            db,
            member.tenant.id,
            tech.id,
        )
        .started_at(Utc::now() - Duration::minutes(90))
        .build()
        .await?;

        let closed = CheckInService::new(db, &realtime)
            .check_out(&manager, session.id)
            .await?;

        assert_eq!(closed.end_reason, Some(CheckInEndReason::CheckedOut));
        assert_eq!(closed.duration_minutes, Some(90));

        Ok(())
    }

    /// Tests listing as a technician while others have sessions.
    ///
    /// Expected: only the technician's own sessions
    #[tokio::test]
    async fn list_limits_technicians_to_own_sessions() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member_with_role(db, "technician").await?;
        let actor = personnel(db, member.tenant.id, member.personnel.id).await?;
        let (_, other) = factory::helpers::add_member(db, member.tenant.id, "technician").await?;
        factory::check_in_session::CheckInSessionFactory::new(db, member.tenant.id, actor.id)
            .build()
            .await?;
        factory::check_in_session::CheckInSessionFactory::new(db, member.tenant.id, other.id)
            .build()
            .await?;

        let sessions = CheckInService::new(db, &realtime)
            .list(
                &actor,
                CheckInFilter {
                    personnel_id: Some(other.id),
                    ..Default::default()
                },
            )
            .await?;

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].personnel_id, actor.id);

        Ok(())
    }

    /// Tests closing sessions whose heartbeat went silent.
    ///
    /// Expected: stale session ended at its last heartbeat, fresh session untouched
    #[tokio::test]
    async fn close_stale_ends_at_last_heartbeat() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let (_, other) = factory::helpers::add_member(db, member.tenant.id, "technician").await?;
        let now = Utc::now();
        let last_heartbeat = now - Duration::minutes(45);
        let stale = factory::check_in_session::CheckInSessionFactory::new(
            db,
            member.tenant.id,
            member.personnel.id,
        )
        .started_at(now - Duration::minutes(105))
        .last_heartbeat_at(last_heartbeat)
        .build()
        .await?;
        let fresh =
            factory::check_in_session::CheckInSessionFactory::new(db, member.tenant.id, other.id)
                .build()
                .await?;

        let closed = CheckInService::new(db, &realtime)
            .close_stale(now, Duration::minutes(30))
            .await?;
        assert_eq!(closed, 1);

        let repo = CheckInRepository::new(db);
        let stale = repo.find_by_id(member.tenant.id, stale.id).await?.unwrap();
        assert_eq!(stale.ended_at, Some(last_heartbeat));
        assert_eq!(stale.end_reason, Some(CheckInEndReason::Stale));
        assert_eq!(stale.duration_minutes, Some(60));
        let fresh = repo.find_by_id(member.tenant.id, fresh.id).await?.unwrap();
        assert!(fresh.is_open());

        Ok(())
    }
}
