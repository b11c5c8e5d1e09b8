use super::*;

/// Tests closing an open session and refusing to close it twice.
///
/// Expected: Ok(true) then Ok(false), with reason and duration stored
#[tokio::test]
async fn closes_open_session_once() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let now = Utc::now();

    let repo = CheckInRepository::new(db);
    let session = repo
        .create(
            member.tenant.id,
            member.personnel.id,
            StartCheckInParams::default(),
            now,
        )
        .await?;

    assert!(
        repo.close(session.id, now, CheckInEndReason::CheckedOut, 42)
            .await?
    );
    assert!(
        !repo
            .close(session.id, now, CheckInEndReason::Stale, 0)
            .await?
    );

    let stored = repo.find_by_id(member.tenant.id, session.id).await?.unwrap();
    assert_eq!(stored.end_reason, Some(CheckInEndReason::CheckedOut));
    assert_eq!(stored.duration_minutes, Some(42));
    assert!(repo
        .find_open_by_personnel(member.personnel.id)
        .await?
        .is_none());

    Ok(())
}
