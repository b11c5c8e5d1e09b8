use super::*;

/// Tests loading personnel with the linked user's profile.
///
/// Expected: Ok(Some) with the user's name and email and the parsed role
#[tokio::test]
async fn finds_personnel_with_user() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_member_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;

    let repo = PersonnelRepository::new(db);
    let personnel = repo
        .find_by_id(member.tenant.id, member.personnel.id)
        .await?
        .unwrap();

    assert_eq!(personnel.name, member.user.name);
    assert_eq!(personnel.email, member.user.email);
    assert_eq!(personnel.role, Role::Owner);

    Ok(())
}

/// Tests that personnel from another tenant is not visible.
///
/// Expected: Ok(None)
#[tokio::test]
async fn hides_personnel_of_other_tenant() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_member_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let other = factory::create_member(db).await?;

    let repo = PersonnelRepository::new(db);
    let result = repo
        .find_by_id(member.tenant.id, other.personnel.id)
        .await?;

    assert!(result.is_none());

    Ok(())
}
