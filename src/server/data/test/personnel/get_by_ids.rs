use super::*;

/// Tests loading a set of personnel ids that mixes tenants.
///
/// Verifies that only ids belonging to the requested tenant are returned, which
/// services rely on to validate assignee lists.
///
/// Expected: Ok with the two in-tenant records
#[tokio::test]
async fn returns_only_tenant_personnel() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_member_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let (_, tech) = factory::helpers::add_member(db, member.tenant.id, "technician").await?;
    let other = factory::create_member(db).await?;

    let repo = PersonnelRepository::new(db);
    let found = repo
        .get_by_ids(
            member.tenant.id,
            &[member.personnel.id, tech.id, other.personnel.id],
        )
        .await?;

    let ids: Vec<i32> = found.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![member.personnel.id, tech.id]);

    Ok(())
}

#[tokio::test]
async fn returns_empty_for_no_ids() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_member_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = PersonnelRepository::new(db);

    assert!(repo.get_by_ids(1, &[]).await?.is_empty());

    Ok(())
}
