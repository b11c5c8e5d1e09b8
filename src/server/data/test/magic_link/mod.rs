use crate::server::{data::magic_link::MagicLinkRepository, model::magic_link::MagicLinkPurpose};
use chrono::{Duration, Utc};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod consume;
mod delete_unconsumed;
mod purge;
