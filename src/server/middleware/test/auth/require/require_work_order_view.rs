use super::*;

/// Tests that a crew member can view the work order.
///
/// Expected: Ok
#[tokio::test]
async fn allows_crew_member() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_board_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member_with_role(db, "technician").await?;
    let work_order = factory::create_work_order(db, member.tenant.id).await?;
    factory::work_order::assign_personnel(db, work_order.id, member.personnel.id).await?;
    AuthSession::new(session)
        .login(member.user.id, member.tenant.id)
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::WorkOrderView(work_order.id)])
        .await;

    assert!(result.is_ok());

    Ok(())
}

/// Tests that a technician off the crew is denied.
///
/// Expected: Err(AuthError::AccessDenied)
#[tokio::test]
async fn denies_non_crew_technician() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_board_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member_with_role(db, "technician").await?;
    let work_order = factory::create_work_order(db, member.tenant.id).await?;
    AuthSession::new(session)
        .login(member.user.id, member.tenant.id)
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::WorkOrderView(work_order.id)])
        .await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
    ));

    Ok(())
}

/// Tests that an unknown work order id is reported missing.
///
/// Expected: Err(AppError::NotFound)
#[tokio::test]
async fn reports_missing_work_order() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_board_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member(db).await?;
    AuthSession::new(session)
        .login(member.user.id, member.tenant.id)
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::WorkOrderView(4242)])
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}
