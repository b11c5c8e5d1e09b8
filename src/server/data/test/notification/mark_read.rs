use super::*;

/// Tests that another user's notification cannot be marked read.
///
/// Expected: Ok(false) and the notification stays unread
#[tokio::test]
async fn refuses_other_users_notification() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let (other_user, _) =
        factory::helpers::add_member(db, member.tenant.id, "technician").await?;
    let notification =
        factory::notification::NotificationFactory::new(db, member.tenant.id, other_user.id)
            .build()
            .await?;

    let repo = NotificationRepository::new(db);
    let marked = repo
        .mark_read(member.tenant.id, member.user.id, notification.id, Utc::now())
        .await?;

    assert!(!marked);
    assert_eq!(repo.count_unread(member.tenant.id, other_user.id).await?, 1);

    Ok(())
}

/// Tests marking all of a user's notifications read.
///
/// Expected: Ok(2), counting only notifications that were unread
#[tokio::test]
async fn marks_all_read() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    for read in [false, false, true] {
        factory::notification::NotificationFactory::new(db, member.tenant.id, member.user.id)
            .read(read)
            .build()
            .await?;
    }

    let repo = NotificationRepository::new(db);

    assert_eq!(
        repo.mark_all_read(member.tenant.id, member.user.id, Utc::now())
            .await?,
        2
    );
    assert_eq!(repo.count_unread(member.tenant.id, member.user.id).await?, 0);

    Ok(())
}
