use crate::server::{
    data::task::TaskRepository,
    model::task::{TaskFilter, UpdateTaskParams},
};
use chrono::{Duration, Utc};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod completion_counts;
mod find_by_id;
mod get_board;
mod get_due_reminders;
mod sync_column_completion;
mod update;
