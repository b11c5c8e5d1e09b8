use crate::server::{
    data::status::StatusRepository,
    model::status::{CreateStatusParams, UpdateStatusParams},
};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod create;
mod set_positions;
