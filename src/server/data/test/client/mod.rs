use crate::server::{data::client::ClientRepository, model::client::ClientParams};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod get_paginated;
mod update;
