use super::*;

/// Tests listing only unread notifications.
///
/// Expected: Ok with the two unread notifications and a matching unread count
#[tokio::test]
async fn lists_unread_only() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let tenant_id = member.tenant.id;
    let user_id = member.user.id;
    factory::notification::NotificationFactory::new(db, tenant_id, user_id)
        .build()
        .await?;
    factory::notification::NotificationFactory::new(db, tenant_id, user_id)
        .kind("moved")
        .build()
        .await?;
    factory::notification::NotificationFactory::new(db, tenant_id, user_id)
        .read(true)
        .build()
        .await?;

    let repo = NotificationRepository::new(db);
    let (unread, total) = repo
        .get_paginated(tenant_id, user_id, true, 0, 10)
        .await?;
    let (_, all) = repo.get_paginated(tenant_id, user_id, false, 0, 10).await?;

    assert_eq!(unread.len(), 2);
    assert_eq!(total, 2);
    assert_eq!(all, 3);
    assert_eq!(repo.count_unread(tenant_id, user_id).await?, 2);

    Ok(())
}
