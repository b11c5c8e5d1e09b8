//! Task timeline (activity log) repository.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::server::model::task::{TimelineEntry, TimelineKind};

pub struct TimelineRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TimelineRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends an entry to a task's timeline.
    ///
    /// # Arguments
    /// - `actor_id` - Personnel who caused the entry, `None` for scheduled work
    ///
    /// # Returns
    /// - `Ok(entity::task_timeline::Model)` - The created entry
    /// - `Err(DbErr)` - Insert failed
    pub async fn create(
        &self,
        tenant_id: i32,
        task_id: i32,
        actor_id: Option<i32>,
        kind: TimelineKind,
        message: String,
    ) -> Result<entity::task_timeline::Model, DbErr> {
        entity::task_timeline::ActiveModel {
            tenant_id: ActiveValue::Set(tenant_id),
            task_id: ActiveValue::Set(task_id),
            actor_id: ActiveValue::Set(actor_id),
            kind: ActiveValue::Set(kind.to_string()),
            message: ActiveValue::Set(message),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }

    /// Timeline of a task, newest first, with actor names resolved.
    ///
    /// Entries whose actor was removed keep their id but have no name.
    pub async fn get_by_task(&self, task_id: i32) -> Result<Vec<TimelineEntry>, DbErr> {
        let entries = entity::prelude::TaskTimeline::find()
            .filter(entity::task_timeline::Column::TaskId.eq(task_id))
            .order_by_desc(entity::task_timeline::Column::CreatedAt)
            .order_by_desc(entity::task_timeline::Column::Id)
            .all(self.db)
            .await?;

        let actor_ids: Vec<i32> = entries.iter().filter_map(|e| e.actor_id).collect();
        let names: HashMap<i32, String> = if actor_ids.is_empty() {
            HashMap::new()
        } else {
            entity::prelude::Personnel::find()
                .filter(entity::personnel::Column::Id.is_in(actor_ids))
                .find_also_related(entity::prelude::User)
                .all(self.db)
                .await?
                .into_iter()
                .filter_map(|(p, u)| u.map(|u| (p.id, u.name)))
                .collect()
        };

        entries
            .into_iter()
            .map(|entry| {
                let name = entry.actor_id.and_then(|id| names.get(&id).cloned());
                TimelineEntry::from_entity(entry, name)
            })
            .collect()
    }

    pub async fn delete_by_task(&self, task_id: i32) -> Result<(), DbErr> {
        entity::prelude::TaskTimeline::delete_many()
            .filter(entity::task_timeline::Column::TaskId.eq(task_id))
            .exec(self.db)
            .await?;
        Ok(())
    }
}
