use super::*;

/// Tests that a work order is loaded with its crew and client name.
///
/// Expected: Ok(Some) with one crew member and the client's name
#[tokio::test]
async fn loads_crew_and_client() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let client = factory::client::ClientFactory::new(db, member.tenant.id)
        .name("Acme Plumbing")
        .build()
        .await?;
    let work_order = factory::work_order::WorkOrderFactory::new(db, member.tenant.id)
        .client_id(client.id)
        .build()
        .await?;
    factory::work_order::assign_personnel(db, work_order.id, member.personnel.id).await?;

    let repo = WorkOrderRepository::new(db);
    let loaded = repo
        .find_by_id(member.tenant.id, work_order.id)
        .await?
        .unwrap();

    assert_eq!(loaded.personnel_ids(), vec![member.personnel.id]);
    assert_eq!(loaded.client_name.as_deref(), Some("Acme Plumbing"));
    assert_eq!(loaded.status, WorkOrderStatus::Pending);

    Ok(())
}
