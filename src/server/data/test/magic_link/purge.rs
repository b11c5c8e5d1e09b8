use super::*;

/// Tests purging links that expired or were consumed before the cutoff.
///
/// Expected: Ok(2) with the fresh link kept
#[tokio::test]
async fn purges_old_links() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let (tenant_id, user_id) = (member.tenant.id, member.user.id);
    let now = Utc::now();
    factory::magic_link::MagicLinkFactory::new(db, tenant_id, user_id)
        .expires_at(now - Duration::hours(30))
        .build()
        .await?;
    factory::magic_link::MagicLinkFactory::new(db, tenant_id, user_id)
        .consumed_at(now - Duration::hours(25))
        .build()
        .await?;
    let fresh = factory::magic_link::MagicLinkFactory::new(db, tenant_id, user_id)
        .build()
        .await?;

    let repo = MagicLinkRepository::new(db);
    let purged = repo.purge(now - Duration::hours(24)).await?;

    assert_eq!(purged, 2);
    assert!(repo.find_by_hash(&fresh.token_hash).await?.is_some());

    Ok(())
}
