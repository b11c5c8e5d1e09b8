use super::*;

/// Tests storing a computed rollup.
///
/// Expected: Ok with counts, progress and status persisted
#[tokio::test]
async fn stores_rollup() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let work_order = factory::create_work_order(db, member.tenant.id).await?;

    let repo = WorkOrderRepository::new(db);
    repo.apply_rollup(work_order.id, rollup(WorkOrderStatus::Pending, 4, 1))
        .await?;

    let loaded = repo
        .find_by_id(member.tenant.id, work_order.id)
        .await?
        .unwrap();
    assert_eq!(loaded.task_count, 4);
    assert_eq!(loaded.completed_task_count, 1);
    assert_eq!(loaded.progress, 25);
    assert_eq!(loaded.status, WorkOrderStatus::InProgress);

    Ok(())
}
