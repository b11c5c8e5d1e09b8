use super::*;

/// Tests counting linked and completed tasks of a work order.
///
/// Expected: Ok((3, 1)), ignoring tasks of other work orders
#[tokio::test]
async fn counts_linked_tasks() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let column = factory::create_status(db, member.tenant.id).await?;
    let work_order = factory::create_work_order(db, member.tenant.id).await?;
    let other = factory::create_work_order(db, member.tenant.id).await?;
    for completed in [true, false, false] {
        let mut builder = factory::task::TaskFactory::new(db, member.tenant.id, column.id)
            .work_order_id(work_order.id);
        if completed {
            builder = builder.completed_at(Utc::now());
        }
        builder.build().await?;
    }
    factory::task::TaskFactory::new(db, member.tenant.id, column.id)
        .work_order_id(other.id)
        .build()
        .await?;

    let repo = TaskRepository::new(db);

    assert_eq!(repo.completion_counts(work_order.id).await?, (3, 1));

    Ok(())
}
