use super::*;

/// Tests replacing all client fields.
///
/// Expected: Ok with every field overwritten, including cleared ones
#[tokio::test]
async fn replaces_client_fields() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let client = factory::client::ClientFactory::new(db, member.tenant.id)
        .email("old@example.com")
        .build()
        .await?;

    let repo = ClientRepository::new(db);
    let updated = repo
        .update(
            client.id,
            ClientParams {
                name: "Renamed".to_string(),
                email: None,
                phone: Some("+30 210 0000000".to_string()),
                address: Some("1 Main St".to_string()),
                notes: None,
            },
        )
        .await?;

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.email, None);
    assert_eq!(updated.phone.as_deref(), Some("+30 210 0000000"));

    Ok(())
}

#[tokio::test]
async fn fails_for_missing_client() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_board_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ClientRepository::new(db);
    let result = repo
        .update(
            999,
            ClientParams {
                name: "Nobody".to_string(),
                email: None,
                phone: None,
                address: None,
                notes: None,
            },
        )
        .await;

    assert!(matches!(result, Err(DbErr::RecordNotFound(_))));

    Ok(())
}
