use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "task")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tenant_id: i32,
    /// Kanban column (status) the task currently sits in.
    pub column_id: i32,
    /// Dense 0-based position within the column.
    pub position: i32,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub work_order_id: Option<i32>,
    pub client_id: Option<i32>,
    pub start_at: Option<DateTimeUtc>,
    pub due_at: Option<DateTimeUtc>,
    pub estimated_hours: Option<f64>,
    /// One of `daily`, `weekly`, `monthly`.
    pub recurrence: Option<String>,
    pub reminder_at: Option<DateTimeUtc>,
    pub reminder_sent: bool,
    /// Set while the task sits in a column flagged `is_completed`.
    pub completed_at: Option<DateTimeUtc>,
    pub created_by: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Tenant,
    #[sea_orm(
        belongs_to = "super::status::Entity",
        from = "Column::ColumnId",
        to = "super::status::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Status,
    #[sea_orm(
        belongs_to = "super::work_order::Entity",
        from = "Column::WorkOrderId",
        to = "super::work_order::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    WorkOrder,
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Client,
    #[sea_orm(has_many = "super::task_assignee::Entity")]
    TaskAssignee,
}

impl Related<super::status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Status.def()
    }
}

impl Related<super::work_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrder.def()
    }
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::task_assignee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaskAssignee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
