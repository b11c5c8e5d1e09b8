use crate::{
    model::work_order::WorkOrderStatus,
    server::{
        data::work_order::WorkOrderRepository,
        model::work_order::{rollup, WorkOrderFilter},
    },
};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod apply_rollup;
mod find_by_id;
mod get_paginated;
