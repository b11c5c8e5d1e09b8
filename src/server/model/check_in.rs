//! Check-in sessions for time tracking.

use chrono::{DateTime, Duration, Utc};
use sea_orm::DbErr;

use crate::{
    model::check_in::{CheckInDto, CheckInEndReason, StartCheckInDto},
    server::model::parse_column,
};

#[derive(Debug, Clone, PartialEq)]
pub struct CheckIn {
    pub id: i32,
    pub tenant_id: i32,
    pub personnel_id: i32,
    pub work_order_id: Option<i32>,
    pub task_id: Option<i32>,
    pub note: Option<String>,
    pub started_at: DateTime<Utc>,
    pub last_heartbeat_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub end_reason: Option<CheckInEndReason>,
    pub duration_minutes: Option<i32>,
}

impl CheckIn {
    pub fn from_entity(entity: entity::check_in_session::Model) -> Result<Self, DbErr> {
        let end_reason = match entity.end_reason.as_deref() {
            Some(value) => Some(parse_column("check_in_session.end_reason", value)?),
            None => None,
        };

        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            personnel_id: entity.personnel_id,
            work_order_id: entity.work_order_id,
            task_id: entity.task_id,
            note: entity.note,
            started_at: entity.started_at,
            last_heartbeat_at: entity.last_heartbeat_at,
            ended_at: entity.ended_at,
            end_reason,
            duration_minutes: entity.duration_minutes,
        })
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Open sessions whose last heartbeat is older than `stale_after`.
    pub fn is_stale(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
        self.is_open() && now - self.last_heartbeat_at > stale_after
    }

    pub fn into_dto(self) -> CheckInDto {
        CheckInDto {
            id: self.id,
            personnel_id: self.personnel_id,
            work_order_id: self.work_order_id,
            task_id: self.task_id,
            note: self.note,
            started_at: self.started_at,
            last_heartbeat_at: self.last_heartbeat_at,
            ended_at: self.ended_at,
            end_reason: self.end_reason,
            duration_minutes: self.duration_minutes,
        }
    }
}

/// Whole minutes between start and end, never negative.
pub fn duration_minutes(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> i32 {
    let minutes = (ended_at - started_at).num_minutes().max(0);
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

#[derive(Debug, Clone, Default)]
pub struct StartCheckInParams {
    pub work_order_id: Option<i32>,
    pub task_id: Option<i32>,
    pub note: Option<String>,
}

impl StartCheckInParams {
    pub fn from_dto(dto: StartCheckInDto) -> Self {
        Self {
            work_order_id: dto.work_order_id,
            task_id: dto.task_id,
            note: dto.note,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckInFilter {
    pub personnel_id: Option<i32>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(last_heartbeat_at: DateTime<Utc>, ended_at: Option<DateTime<Utc>>) -> CheckIn {
        CheckIn {
            id: 1,
            tenant_id: 1,
            personnel_id: 1,
            work_order_id: None,
            task_id: None,
            note: None,
            started_at: Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap(),
            last_heartbeat_at,
            ended_at,
            end_reason: None,
            duration_minutes: None,
        }
    }

    #[test]
    fn computes_whole_minutes() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();

        assert_eq!(duration_minutes(start, start + Duration::seconds(5399)), 89);
        assert_eq!(duration_minutes(start, start - Duration::minutes(3)), 0);
    }

    /// Tests staleness against the heartbeat threshold.
    ///
    /// Expected: only an open session past the threshold is stale
    #[test]
    fn detects_stale_sessions() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let threshold = Duration::minutes(15);

        assert!(session(now - Duration::minutes(16), None).is_stale(now, threshold));
        assert!(!session(now - Duration::minutes(10), None).is_stale(now, threshold));
        assert!(!session(now - Duration::minutes(30), Some(now)).is_stale(now, threshold));
    }
}
