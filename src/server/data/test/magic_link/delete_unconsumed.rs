use super::*;

/// Tests invalidating earlier links of the same purpose.
///
/// Verifies that only unconsumed links with the requested purpose are deleted.
///
/// Expected: Ok(1) with the invitation and consumed login links kept
#[tokio::test]
async fn deletes_only_matching_unconsumed_links() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let (tenant_id, user_id) = (member.tenant.id, member.user.id);
    let pending = factory::magic_link::MagicLinkFactory::new(db, tenant_id, user_id)
        .build()
        .await?;
    let consumed = factory::magic_link::MagicLinkFactory::new(db, tenant_id, user_id)
        .consumed_at(Utc::now())
        .build()
        .await?;
    let invitation = factory::magic_link::MagicLinkFactory::new(db, tenant_id, user_id)
        .purpose("invitation")
        .build()
        .await?;

    let repo = MagicLinkRepository::new(db);
    let deleted = repo
        .delete_unconsumed(tenant_id, user_id, MagicLinkPurpose::Login)
        .await?;

    assert_eq!(deleted, 1);
    assert!(repo.find_by_hash(&pending.token_hash).await?.is_none());
    assert!(repo.find_by_hash(&consumed.token_hash).await?.is_some());
    assert!(repo.find_by_hash(&invitation.token_hash).await?.is_some());

    Ok(())
}
