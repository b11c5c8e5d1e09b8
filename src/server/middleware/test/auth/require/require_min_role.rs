use super::*;

/// Tests that a role above the minimum passes.
///
/// Expected: Ok for an owner requiring manager
#[tokio::test]
async fn allows_higher_role() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_member_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member(db).await?;
    AuthSession::new(session)
        .login(member.user.id, member.tenant.id)
        .await?;

    let context = AuthGuard::new(db, session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await?;

    assert!(context.is_manager());
    assert_eq!(context.viewer(), None);

    Ok(())
}

/// Tests that a role below the minimum is denied.
///
/// Expected: Err(AuthError::AccessDenied) for a technician requiring manager
#[tokio::test]
async fn denies_lower_role() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_member_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member_with_role(db, "technician").await?;
    AuthSession::new(session)
        .login(member.user.id, member.tenant.id)
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::MinRole(Role::Manager)])
        .await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
    ));

    Ok(())
}

/// Tests that the exact minimum role passes.
///
/// Expected: Ok for an admin requiring admin
#[tokio::test]
async fn allows_exact_role() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_member_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member_with_role(db, "admin").await?;
    AuthSession::new(session)
        .login(member.user.id, member.tenant.id)
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::MinRole(Role::Admin)])
        .await;

    assert!(result.is_ok());

    Ok(())
}
