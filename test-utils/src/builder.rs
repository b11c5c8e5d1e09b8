use entity::prelude::*;
use sea_orm::{sea_query::TableCreateStatement, EntityTrait, Schema};

use crate::{context::TestContext, error::TestError};

/// Builder for test contexts with a chosen subset of the fieldops schema.
///
/// Tables are created in the order they are added, so parents must come before
/// children. The `with_*_tables` helpers add common groups in dependency order.
///
/// # Example
///
/// ```rust,ignore
/// let test = TestBuilder::new()
///     .with_member_tables()
///     .with_table(Client)
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    tables: Vec<TableCreateStatement>,
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBuilder {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    /// Adds the CREATE TABLE statement for `entity` using the SQLite backend.
    pub fn with_table<E: EntityTrait>(mut self, entity: E) -> Self {
        let schema = Schema::new(sea_orm::DbBackend::Sqlite);
        self.tables.push(schema.create_table_from_entity(entity));
        self
    }

    /// Tenant, User and Personnel: everything needed to authenticate a member.
    pub fn with_member_tables(self) -> Self {
        self.with_table(Tenant)
            .with_table(User)
            .with_table(Personnel)
    }

    /// Member tables plus clients, columns, work orders, tasks and their joins.
    ///
    /// Use this for anything touching the board, work-order rollups or assignment
    /// propagation.
    pub fn with_board_tables(self) -> Self {
        self.with_member_tables()
            .with_table(Client)
            .with_table(Status)
            .with_table(WorkOrder)
            .with_table(WorkOrderPersonnel)
            .with_table(Task)
            .with_table(TaskAssignee)
            .with_table(TaskTimeline)
    }

    /// Every table in the schema.
    pub fn with_all_tables(self) -> Self {
        self.with_board_tables()
            .with_table(Notification)
            .with_table(MagicLink)
            .with_table(CheckInSession)
            .with_table(Attachment)
    }

    /// Connects to a fresh in-memory database and creates the configured tables.
    pub async fn build(self) -> Result<TestContext, TestError> {
        let mut setup = TestContext::new();

        setup.with_tables(self.tables).await?;

        Ok(setup)
    }
}
