use super::*;

/// Tests that a link can only be consumed once.
///
/// Expected: Ok(true) on the first call and Ok(false) on the second
#[tokio::test]
async fn consumes_once() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let link = factory::magic_link::MagicLinkFactory::new(db, member.tenant.id, member.user.id)
        .build()
        .await?;

    let repo = MagicLinkRepository::new(db);

    assert!(repo.consume(link.id, Utc::now()).await?);
    assert!(!repo.consume(link.id, Utc::now()).await?);
    let stored = repo.find_by_hash(&link.token_hash).await?.unwrap();
    assert!(stored.consumed_at.is_some());

    Ok(())
}
