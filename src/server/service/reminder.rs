use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::{
    model::notification::NotificationKind,
    server::{
        data::{personnel::PersonnelRepository, task::TaskRepository},
        error::AppError,
        model::{notification::NewNotification, task::Task},
        realtime::RealtimeHub,
        service::{delivery::DeliveryService, notification::NotificationService},
    },
};

pub struct ReminderService<'a> {
    db: &'a DatabaseConnection,
    realtime: &'a RealtimeHub,
    delivery: &'a DeliveryService,
}

impl<'a> ReminderService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        realtime: &'a RealtimeHub,
        delivery: &'a DeliveryService,
    ) -> Self {
        Self {
            db,
            realtime,
            delivery,
        }
    }

    /// Sends every reminder due at `now` and marks it sent.
    ///
    /// Each assignee gets an email, an SMS when their account has a phone number, and an
    /// in-app notification. Delivery failures are logged; the reminder is still marked
    /// sent so a broken provider does not cause a resend every minute.
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of tasks whose reminder was processed
    pub async fn send_due(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let task_repo = TaskRepository::new(self.db);
        let due = task_repo.get_due_reminders(now).await?;

        for task in &due {
            self.send(task).await?;
            task_repo.mark_reminder_sent(task.id).await?;
        }

        if !due.is_empty() {
            tracing::info!(count = due.len(), "Sent task reminders");
        }
        Ok(due.len())
    }

    async fn send(&self, task: &Task) -> Result<(), AppError> {
        let assignees = PersonnelRepository::new(self.db)
            .get_by_ids(task.tenant_id, &task.assignee_ids())
            .await?;
        let due = task
            .due_at
            .map(|due| format!(" (due {})", due.format("%Y-%m-%d %H:%M UTC")))
            .unwrap_or_default();
        let subject = format!("Reminder: {}", task.title);
        let body = format!("Reminder for task \"{}\"{}", task.title, due);

        for person in &assignees {
            if let Err(e) = self.delivery.send_email(&person.email, &subject, &body).await {
                tracing::error!(
                    task_id = task.id,
                    personnel_id = person.id,
                    "Reminder email failed: {}",
                    e
                );
            }
            if let Some(phone) = &person.phone {
                if let Err(e) = self.delivery.send_sms(phone, &body).await {
                    tracing::error!(
                        task_id = task.id,
                        personnel_id = person.id,
                        "Reminder SMS failed: {}",
                        e
                    );
                }
            }
        }

        NotificationService::new(self.db, self.realtime)
            .notify_or_log(
                task.tenant_id,
                &task.assignee_ids(),
                None,
                &NewNotification::for_task(NotificationKind::Reminder, task.id, subject, body),
            )
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::data::notification::NotificationRepository;
    use chrono::Duration;
    use test_utils::{builder::TestBuilder, factory};

    /// Tests one due and one future reminder.
    ///
    /// Expected: only the due task is processed, its assignee notified, and it is not
    /// sent again on the next run
    #[tokio::test]
    async fn sends_due_reminders_once() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();
        let delivery = DeliveryService::new(reqwest::Client::new(), None, Vec::new());

        let member = factory::create_member(db).await?;
        let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
        let now = Utc::now();
        let due = factory::task::TaskFactory::new(db, member.tenant.id, todo.id)
            .reminder_at(now - Duration::minutes(1))
            .build()
            .await?;
        factory::task::assign(db, due.id, member.personnel.id).await?;
        factory::task::TaskFactory::new(db, member.tenant.id, todo.id)
            .reminder_at(now + Duration::hours(1))
            .build()
            .await?;

        let service = ReminderService::new(db, &realtime, &delivery);
        assert_eq!(service.send_due(now).await?, 1);
        assert_eq!(service.send_due(now).await?, 0);

        assert_eq!(
            NotificationRepository::new(db)
                .count_unread(member.tenant.id, member.user.id)
                .await?,
            1
        );

        Ok(())
    }
}
