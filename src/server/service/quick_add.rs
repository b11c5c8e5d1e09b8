//! Quick add: parse a sentence into a task draft, resolve its names, optionally create it.

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::{
    model::quick_add::{EntityMatchDto, Intent, ResolvedDraftDto, TaskDraftDto},
    server::{
        data::{
            client::ClientRepository, personnel::PersonnelRepository,
            work_order::WorkOrderRepository,
        },
        error::AppError,
        model::{
            personnel::Personnel,
            task::{CreateTaskParams, Task},
        },
        realtime::RealtimeHub,
        service::task::TaskService,
        util::quick_add::{parse, ParsedTask},
    },
};

/// Draft names matched against tenant records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedDraft {
    pub assignee_ids: Vec<i32>,
    pub work_order_id: Option<i32>,
    pub client_id: Option<i32>,
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub parsed: ParsedTask,
    pub resolved: ResolvedDraft,
}

impl TaskDraft {
    pub fn into_dto(self) -> TaskDraftDto {
        let parsed = self.parsed;
        TaskDraftDto {
            intent: parsed.intent,
            title: parsed.title,
            description: parsed.description,
            priority: parsed.priority,
            assignees: parsed.assignees,
            work_order: parsed.work_order,
            project: parsed.project,
            client: parsed.client,
            due_date: parsed.due_date,
            start_date: parsed.start_date,
            estimated_hours: parsed.estimated_hours,
            entities: parsed
                .entities
                .into_iter()
                .map(|e| EntityMatchDto {
                    kind: e.kind,
                    value: e.value,
                    symbol: e.symbol.to_string(),
                })
                .collect(),
            confidence: parsed.confidence,
            resolved: ResolvedDraftDto {
                assignee_ids: self.resolved.assignee_ids,
                work_order_id: self.resolved.work_order_id,
                client_id: self.resolved.client_id,
                unresolved: self.resolved.unresolved,
            },
        }
    }

    fn into_task_params(self) -> CreateTaskParams {
        CreateTaskParams {
            title: self.parsed.title,
            description: self.parsed.description,
            column_id: None,
            priority: self.parsed.priority,
            work_order_id: self.resolved.work_order_id,
            client_id: self.resolved.client_id,
            start_at: self.parsed.start_date,
            due_at: self.parsed.due_date,
            estimated_hours: self.parsed.estimated_hours,
            recurrence: None,
            reminder_at: None,
            assignee_ids: self.resolved.assignee_ids,
        }
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

pub struct QuickAddService<'a> {
    db: &'a DatabaseConnection,
    realtime: &'a RealtimeHub,
}

impl<'a> QuickAddService<'a> {
    pub fn new(db: &'a DatabaseConnection, realtime: &'a RealtimeHub) -> Self {
        Self { db, realtime }
    }

    /// Parses `text` and resolves its names within the tenant.
    ///
    /// # Returns
    /// - `Ok(TaskDraft)` - The draft with resolved ids and unresolved names
    /// - `Err(AppError::BadRequest)` - Blank text
    pub async fn parse(&self, tenant_id: i32, text: &str) -> Result<TaskDraft, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::BadRequest("Text is required".to_string()));
        }

        let parsed = parse(text, Utc::now());
        let resolved = self.resolve(tenant_id, &parsed).await?;

        Ok(TaskDraft { parsed, resolved })
    }

    async fn resolve(
        &self,
        tenant_id: i32,
        parsed: &ParsedTask,
    ) -> Result<ResolvedDraft, AppError> {
        let mut resolved = ResolvedDraft::default();

        if !parsed.assignees.is_empty() {
            let personnel = PersonnelRepository::new(self.db).get_all(tenant_id).await?;
            for name in &parsed.assignees {
                match personnel.iter().find(|p| same_name(&p.name, name)) {
                    Some(p) if !resolved.assignee_ids.contains(&p.id) => {
                        resolved.assignee_ids.push(p.id)
                    }
                    Some(_) => {}
                    None => resolved.unresolved.push(format!("@{}", name)),
                }
            }
        }

        if let Some(title) = &parsed.work_order {
            let work_orders = WorkOrderRepository::new(self.db).get_all(tenant_id).await?;
            resolved.work_order_id = work_orders
                .iter()
                .find(|w| same_name(&w.title, title))
                .map(|w| w.id);
            if resolved.work_order_id.is_none() {
                resolved.unresolved.push(format!("#{}", title));
            }
        }

        if let Some(name) = &parsed.client {
            let clients = ClientRepository::new(self.db).get_all(tenant_id).await?;
            resolved.client_id = clients
                .iter()
                .find(|c| same_name(&c.name, name))
                .map(|c| c.id);
            if resolved.client_id.is_none() {
                resolved.unresolved.push(format!("&{}", name));
            }
        }

        Ok(resolved)
    }

    /// Parses `text` and creates the task it describes.
    ///
    /// # Returns
    /// - `Ok((Task, TaskDraft))` - The created task and the draft it came from
    /// - `Err(AppError::BadRequest)` - Blank text or the text is not a create request
    pub async fn create(
        &self,
        actor: &Personnel,
        text: &str,
    ) -> Result<(Task, TaskDraft), AppError> {
        let draft = self.parse(actor.tenant_id, text).await?;
        if draft.parsed.intent != Intent::CreateTask {
            return Err(AppError::BadRequest(
                "Text does not describe a new task".to_string(),
            ));
        }

        let task = TaskService::new(self.db, self.realtime)
            .create(actor, draft.clone().into_task_params())
            .await?;

        Ok((task, draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use test_utils::{builder::TestBuilder, factory};

    /// Tests resolving mixed-case names against tenant records.
    ///
    /// Expected: personnel and client resolved, unknown work order reported
    #[tokio::test]
    async fn resolves_names_case_insensitively() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let maria = factory::user::UserFactory::new(db).name("Maria").build().await?;
        let maria = factory::personnel::PersonnelFactory::new(db, member.tenant.id, maria.id)
            .role("technician")
            .build()
            .await?;
        let client = factory::client::ClientFactory::new(db, member.tenant.id)
            .name("Acme")
            .build()
            .await?;

        let draft = QuickAddService::new(db, &realtime)
            .parse(
                member.tenant.id,
                "create task 'Fix pump' urgent for @maria with &ACME in #Nowhere",
            )
            .await?;

        assert_eq!(draft.parsed.intent, Intent::CreateTask);
        assert_eq!(draft.parsed.title, "Fix pump");
        assert_eq!(draft.parsed.priority, Priority::Urgent);
        assert_eq!(draft.resolved.assignee_ids, vec![maria.id]);
        assert_eq!(draft.resolved.client_id, Some(client.id));
        assert_eq!(draft.resolved.work_order_id, None);
        assert_eq!(draft.resolved.unresolved, vec!["#Nowhere".to_string()]);

        Ok(())
    }

    /// Tests quick-adding a task from a sentence.
    ///
    /// Expected: task created in the first column with the parsed title and assignee
    #[tokio::test]
    async fn creates_task_from_text() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let actor = PersonnelRepository::new(db)
            .find_by_id(member.tenant.id, member.personnel.id)
            .await?
            .unwrap();
        let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;

        let (task, _) = QuickAddService::new(db, &realtime)
            .create(&actor, "add task \"Check meters\" high")
            .await?;

        assert_eq!(task.title, "Check meters");
        assert_eq!(task.column_id, todo.id);
        assert_eq!(task.priority, Priority::High);

        Ok(())
    }

    /// Tests quick-adding text that is not a create request, and blank text.
    ///
    /// Expected: Err(AppError::BadRequest) for both
    #[tokio::test]
    async fn rejects_non_create_text() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let actor = PersonnelRepository::new(db)
            .find_by_id(member.tenant.id, member.personnel.id)
            .await?
            .unwrap();
        factory::create_default_columns(db, member.tenant.id).await?;
        let service = QuickAddService::new(db, &realtime);

        let update = service.create(&actor, "update task /Fix pump urgent").await;
        assert!(matches!(update, Err(AppError::BadRequest(_))));

        let blank = service.create(&actor, "   ").await;
        assert!(matches!(blank, Err(AppError::BadRequest(_))));

        Ok(())
    }
}
