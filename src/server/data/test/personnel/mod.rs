use crate::{model::personnel::Role, server::data::personnel::PersonnelRepository};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod count_owners;
mod find_by_id;
mod get_by_ids;
mod get_paginated;
