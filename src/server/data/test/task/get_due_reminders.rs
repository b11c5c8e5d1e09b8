use super::*;

/// Tests selecting tasks whose reminder is due.
///
/// Verifies that future reminders, already sent reminders and completed tasks are
/// skipped.
///
/// Expected: Ok with only the due, unsent, open task
#[tokio::test]
async fn selects_due_unsent_reminders() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let column = factory::create_status(db, member.tenant.id).await?;
    let now = Utc::now();
    let due = factory::task::TaskFactory::new(db, member.tenant.id, column.id)
        .reminder_at(now - Duration::minutes(1))
        .build()
        .await?;
    factory::task::TaskFactory::new(db, member.tenant.id, column.id)
        .reminder_at(now + Duration::hours(1))
        .build()
        .await?;
    factory::task::TaskFactory::new(db, member.tenant.id, column.id)
        .reminder_at(now - Duration::minutes(5))
        .completed_at(now)
        .build()
        .await?;
    let sent = factory::task::TaskFactory::new(db, member.tenant.id, column.id)
        .reminder_at(now - Duration::minutes(5))
        .build()
        .await?;

    let repo = TaskRepository::new(db);
    repo.mark_reminder_sent(sent.id).await?;
    let reminders = repo.get_due_reminders(now).await?;

    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].id, due.id);

    Ok(())
}
