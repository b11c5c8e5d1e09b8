use super::*;

/// Tests technician visibility on the board.
///
/// Verifies that a technician sees tasks they are assigned to and tasks of work
/// orders whose crew they are on, but not other tasks.
///
/// Expected: Ok with the assigned task and the crew task only
#[tokio::test]
async fn restricts_technician_to_visible_tasks() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let (_, tech) = factory::helpers::add_member(db, member.tenant.id, "technician").await?;
    let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
    let work_order = factory::create_work_order(db, member.tenant.id).await?;
    factory::work_order::assign_personnel(db, work_order.id, tech.id).await?;

    let assigned = factory::task::TaskFactory::new(db, member.tenant.id, todo.id)
        .position(0)
        .build()
        .await?;
    factory::task::assign(db, assigned.id, tech.id).await?;
    let crew_task = factory::task::TaskFactory::new(db, member.tenant.id, todo.id)
        .position(1)
        .work_order_id(work_order.id)
        .build()
        .await?;
    factory::task::TaskFactory::new(db, member.tenant.id, todo.id)
        .position(2)
        .build()
        .await?;

    let repo = TaskRepository::new(db);
    let visible = repo
        .get_board(member.tenant.id, &TaskFilter::default(), Some(tech.id))
        .await?;
    let everything = repo
        .get_board(member.tenant.id, &TaskFilter::default(), None)
        .await?;

    let ids: Vec<i32> = visible.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![assigned.id, crew_task.id]);
    assert_eq!(everything.len(), 3);

    Ok(())
}

/// Tests filtering the board by assignee.
///
/// Expected: Ok with only the task assigned to the requested personnel
#[tokio::test]
async fn filters_by_assignee() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let column = factory::create_status(db, member.tenant.id).await?;
    let mine = factory::create_task(db, member.tenant.id, column.id).await?;
    factory::task::assign(db, mine.id, member.personnel.id).await?;
    factory::create_task(db, member.tenant.id, column.id).await?;

    let repo = TaskRepository::new(db);
    let filter = TaskFilter {
        assignee_id: Some(member.personnel.id),
        ..Default::default()
    };
    let tasks = repo.get_board(member.tenant.id, &filter, None).await?;

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, mine.id);

    Ok(())
}
