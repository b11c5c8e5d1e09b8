use super::*;

/// Tests that a loaded task carries assignees, work order title and client name.
///
/// Expected: Ok(Some) with all details attached
#[tokio::test]
async fn loads_task_details() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
    let client = factory::create_client(db, member.tenant.id).await?;
    let work_order = factory::work_order::WorkOrderFactory::new(db, member.tenant.id)
        .title("Boiler service")
        .build()
        .await?;
    let task = factory::task::TaskFactory::new(db, member.tenant.id, todo.id)
        .work_order_id(work_order.id)
        .client_id(client.id)
        .build()
        .await?;
    factory::task::assign(db, task.id, member.personnel.id).await?;

    let repo = TaskRepository::new(db);
    let loaded = repo.find_by_id(member.tenant.id, task.id).await?.unwrap();

    assert_eq!(loaded.assignee_ids(), vec![member.personnel.id]);
    assert_eq!(loaded.assignees[0].name, member.user.name);
    assert_eq!(loaded.work_order_title.as_deref(), Some("Boiler service"));
    assert_eq!(loaded.client_name, Some(client.name));

    Ok(())
}

/// Tests that a task from another tenant is reported as missing.
///
/// Expected: Ok(None)
#[tokio::test]
async fn hides_task_of_other_tenant() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let other = factory::create_member(db).await?;
    let column = factory::create_status(db, other.tenant.id).await?;
    let task = factory::create_task(db, other.tenant.id, column.id).await?;

    let repo = TaskRepository::new(db);

    assert!(repo.find_by_id(member.tenant.id, task.id).await?.is_none());

    Ok(())
}
