use super::*;
use chrono::TimeZone;

/// Tests marking a column completed.
///
/// Verifies that open tasks get a completion timestamp while already completed
/// tasks keep theirs.
///
/// Expected: Ok(1) with both tasks completed and the earlier timestamp preserved
#[tokio::test]
async fn completes_open_tasks_in_column() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let column = factory::create_status(db, member.tenant.id).await?;
    let earlier = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
    let done = factory::task::TaskFactory::new(db, member.tenant.id, column.id)
        .completed_at(earlier)
        .build()
        .await?;
    let open = factory::create_task(db, member.tenant.id, column.id).await?;

    let repo = TaskRepository::new(db);
    let changed = repo
        .sync_column_completion(column.id, true, Utc::now())
        .await?;

    assert_eq!(changed, 1);
    let done = repo.find_by_id(member.tenant.id, done.id).await?.unwrap();
    let open = repo.find_by_id(member.tenant.id, open.id).await?.unwrap();
    assert_eq!(done.completed_at, Some(earlier));
    assert!(open.completed_at.is_some());

    Ok(())
}

/// Tests clearing completion when a column stops being a completed column.
///
/// Expected: Ok(1) with `completed_at` cleared
#[tokio::test]
async fn reopens_tasks_in_column() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let column = factory::create_status(db, member.tenant.id).await?;
    let task = factory::task::TaskFactory::new(db, member.tenant.id, column.id)
        .completed_at(Utc::now())
        .build()
        .await?;

    let repo = TaskRepository::new(db);

    assert_eq!(
        repo.sync_column_completion(column.id, false, Utc::now())
            .await?,
        1
    );
    let task = repo.find_by_id(member.tenant.id, task.id).await?.unwrap();
    assert!(task.completed_at.is_none());

    Ok(())
}
