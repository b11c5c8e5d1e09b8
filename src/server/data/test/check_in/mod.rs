use crate::{
    model::check_in::CheckInEndReason,
    server::{data::check_in::CheckInRepository, model::check_in::StartCheckInParams},
};
use chrono::{Duration, Utc};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod close;
mod get_stale;
