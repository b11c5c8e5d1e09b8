use super::*;

/// Tests that absent fields are kept and explicit nulls clear values.
///
/// Expected: Ok with title changed, due date cleared and priority untouched
#[tokio::test]
async fn applies_partial_update() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let column = factory::create_status(db, member.tenant.id).await?;
    let task = factory::task::TaskFactory::new(db, member.tenant.id, column.id)
        .priority("high")
        .due_at(Utc::now() + Duration::days(2))
        .build()
        .await?;

    let repo = TaskRepository::new(db);
    repo.update(
        task.id,
        UpdateTaskParams {
            title: Some("Replace thermostat".to_string()),
            due_at: Some(None),
            ..Default::default()
        },
        false,
    )
    .await?;

    let updated = repo.find_by_id(member.tenant.id, task.id).await?.unwrap();
    assert_eq!(updated.title, "Replace thermostat");
    assert_eq!(updated.due_at, None);
    assert_eq!(updated.priority.to_string(), "high");

    Ok(())
}
