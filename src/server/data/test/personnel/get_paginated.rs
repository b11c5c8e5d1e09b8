use super::*;

/// Tests paging through a tenant's personnel.
///
/// Expected: Ok with two records on the first page and a total of three
#[tokio::test]
async fn paginates_personnel() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_member_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    factory::helpers::add_member(db, member.tenant.id, "manager").await?;
    factory::helpers::add_member(db, member.tenant.id, "technician").await?;
    factory::create_member(db).await?;

    let repo = PersonnelRepository::new(db);
    let (page, total) = repo.get_paginated(member.tenant.id, 0, 2).await?;

    assert_eq!(page.len(), 2);
    assert_eq!(total, 3);

    Ok(())
}
