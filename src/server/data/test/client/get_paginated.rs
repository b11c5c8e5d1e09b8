use super::*;

/// Tests searching clients by a name substring regardless of case.
///
/// Expected: Ok with the single matching client
#[tokio::test]
async fn searches_by_name_case_insensitively() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    factory::client::ClientFactory::new(db, member.tenant.id)
        .name("Acme Plumbing")
        .build()
        .await?;
    factory::client::ClientFactory::new(db, member.tenant.id)
        .name("Northwind Electric")
        .build()
        .await?;

    let repo = ClientRepository::new(db);
    let (clients, total) = repo
        .get_paginated(member.tenant.id, Some("plumb"), 0, 10)
        .await?;

    assert_eq!(total, 1);
    assert_eq!(clients[0].name, "Acme Plumbing");

    Ok(())
}

/// Tests that listing is ordered by name and scoped to the tenant.
///
/// Expected: Ok with the tenant's two clients in alphabetical order
#[tokio::test]
async fn lists_tenant_clients_by_name() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let other = factory::create_member(db).await?;
    for name in ["Zenith Homes", "Birch Dental"] {
        factory::client::ClientFactory::new(db, member.tenant.id)
            .name(name)
            .build()
            .await?;
    }
    factory::create_client(db, other.tenant.id).await?;

    let repo = ClientRepository::new(db);
    let (clients, total) = repo.get_paginated(member.tenant.id, None, 0, 10).await?;

    let names: Vec<&str> = clients.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Birch Dental", "Zenith Homes"]);
    assert_eq!(total, 2);

    Ok(())
}
