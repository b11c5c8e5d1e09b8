use super::*;

/// Tests selecting open sessions without a recent heartbeat.
///
/// Expected: Ok with only the open session whose heartbeat is before the cutoff
#[tokio::test]
async fn selects_open_sessions_past_cutoff() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_all_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let member = factory::create_member(db).await?;
    let (_, other) = factory::helpers::add_member(db, member.tenant.id, "technician").await?;
    let (_, third) = factory::helpers::add_member(db, member.tenant.id, "technician").await?;
    let now = Utc::now();

    let stale = factory::check_in_session::CheckInSessionFactory::new(
        db,
        member.tenant.id,
        member.personnel.id,
    )
    .last_heartbeat_at(now - Duration::minutes(20))
    .build()
    .await?;
    factory::check_in_session::CheckInSessionFactory::new(db, member.tenant.id, other.id)
        .last_heartbeat_at(now - Duration::minutes(2))
        .build()
        .await?;
    factory::check_in_session::CheckInSessionFactory::new(db, member.tenant.id, third.id)
        .last_heartbeat_at(now - Duration::minutes(40))
        .ended_at(now - Duration::minutes(30))
        .build()
        .await?;

    let repo = CheckInRepository::new(db);
    let sessions = repo.get_stale(now - Duration::minutes(15)).await?;

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, stale.id);

    Ok(())
}
