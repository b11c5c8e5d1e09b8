use super::*;

/// Tests that technicians only list work orders whose crew they are on.
///
/// Expected: Ok with one work order for the technician and two for a manager view
#[tokio::test]
async fn restricts_technician_to_crew() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let (_, tech) = factory::helpers::add_member(db, member.tenant.id, "technician").await?;
    let crewed = factory::create_work_order(db, member.tenant.id).await?;
    factory::create_work_order(db, member.tenant.id).await?;
    factory::work_order::assign_personnel(db, crewed.id, tech.id).await?;

    let repo = WorkOrderRepository::new(db);
    let filter = WorkOrderFilter::default();
    let (visible, total) = repo
        .get_paginated(member.tenant.id, &filter, Some(tech.id), 0, 10)
        .await?;
    let (_, all) = repo
        .get_paginated(member.tenant.id, &filter, None, 0, 10)
        .await?;

    assert_eq!(total, 1);
    assert_eq!(visible[0].id, crewed.id);
    assert_eq!(all, 2);

    Ok(())
}

/// Tests filtering by status and title search.
///
/// Expected: Ok with only the in-progress work order matching the search
#[tokio::test]
async fn filters_by_status_and_search() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let target = factory::work_order::WorkOrderFactory::new(db, member.tenant.id)
        .title("Roof repair")
        .status("in_progress")
        .build()
        .await?;
    factory::work_order::WorkOrderFactory::new(db, member.tenant.id)
        .title("Roof inspection")
        .build()
        .await?;

    let repo = WorkOrderRepository::new(db);
    let filter = WorkOrderFilter {
        status: Some(WorkOrderStatus::InProgress),
        search: Some("roof".to_string()),
        ..Default::default()
    };
    let (work_orders, total) = repo
        .get_paginated(member.tenant.id, &filter, None, 0, 10)
        .await?;

    assert_eq!(total, 1);
    assert_eq!(work_orders[0].id, target.id);

    Ok(())
}
