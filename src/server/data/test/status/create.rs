use super::*;

/// Tests that a new column is appended after existing ones.
///
/// Expected: Ok with position 3 after the three default columns
#[tokio::test]
async fn appends_column_at_end() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    factory::create_default_columns(db, member.tenant.id).await?;

    let repo = StatusRepository::new(db);
    let status = repo
        .create(
            member.tenant.id,
            CreateStatusParams {
                name: "Blocked".to_string(),
                color: "#ef4444".to_string(),
                is_completed: false,
            },
        )
        .await?;

    assert_eq!(status.position, 3);
    assert_eq!(repo.get_all(member.tenant.id).await?.len(), 4);

    Ok(())
}

/// Tests a partial update that only flips the completion flag.
///
/// Expected: Ok with the name kept and `is_completed` set
#[tokio::test]
async fn updates_only_provided_fields() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;

    let repo = StatusRepository::new(db);
    let updated = repo
        .update(
            todo.id,
            UpdateStatusParams {
                is_completed: Some(true),
                ..Default::default()
            },
        )
        .await?;

    assert_eq!(updated.name, "To Do");
    assert!(updated.is_completed);

    Ok(())
}
