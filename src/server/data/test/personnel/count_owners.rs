use super::*;

/// Tests counting owners in a tenant with mixed roles.
///
/// Expected: Ok(2)
#[tokio::test]
async fn counts_only_owners() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_member_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    factory::helpers::add_member(db, member.tenant.id, "owner").await?;
    factory::helpers::add_member(db, member.tenant.id, "admin").await?;

    let repo = PersonnelRepository::new(db);

    assert_eq!(repo.count_owners(member.tenant.id).await?, 2);

    Ok(())
}

/// Tests that an invited owner who has not signed in yet is not counted.
///
/// Expected: Ok(1)
#[tokio::test]
async fn skips_inactive_owners() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_member_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let invited = factory::create_user(db).await?;
    factory::personnel::PersonnelFactory::new(db, member.tenant.id, invited.id)
        .role("owner")
        .active(false)
        .build()
        .await?;

    let repo = PersonnelRepository::new(db);

    assert_eq!(repo.count_owners(member.tenant.id).await?, 1);

    Ok(())
}
