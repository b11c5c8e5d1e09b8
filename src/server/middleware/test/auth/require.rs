use super::*;

mod require_min_role;
mod require_task_access;
mod require_work_order_view;

/// Tests that an anonymous session is rejected.
///
/// Expected: Err(AuthError::UserNotInSession)
#[tokio::test]
async fn rejects_missing_session_user() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_member_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let result = AuthGuard::new(db, session).require(&[]).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::UserNotInSession))
    ));

    Ok(())
}

/// Tests that a session pointing at a deleted user is rejected.
///
/// Expected: Err(AuthError::UserNotInDatabase)
#[tokio::test]
async fn rejects_unknown_user() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_member_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    AuthSession::new(session).login(999, 1).await?;

    let result = AuthGuard::new(db, session).require(&[]).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::UserNotInDatabase(999)))
    ));

    Ok(())
}

/// Tests that a user whose session tenant they do not belong to is rejected.
///
/// Expected: Err(AuthError::NotTenantMember)
#[tokio::test]
async fn rejects_user_outside_tenant() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_member_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member(db).await?;
    let other_tenant = factory::create_tenant(db).await?;
    AuthSession::new(session)
        .login(member.user.id, other_tenant.id)
        .await?;

    let result = AuthGuard::new(db, session).require(&[]).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::NotTenantMember(_, _)))
    ));

    Ok(())
}

/// Tests that deactivated personnel lose access to their tenant.
///
/// Expected: Err(AuthError::NotTenantMember)
#[tokio::test]
async fn rejects_inactive_personnel() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_member_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let tenant = factory::create_tenant(db).await?;
    let user = factory::create_user(db).await?;
    factory::personnel::PersonnelFactory::new(db, tenant.id, user.id)
        .active(false)
        .build()
        .await?;
    AuthSession::new(session).login(user.id, tenant.id).await?;

    let result = AuthGuard::new(db, session).require(&[]).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::NotTenantMember(_, _)))
    ));

    Ok(())
}

/// Tests that an active member passes with no permissions and gets a populated context.
///
/// Expected: Ok(AuthContext) carrying the user, personnel and tenant
#[tokio::test]
async fn resolves_context_for_member() -> Result<(), AppError> {
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

    let context = AuthGuard::new(db, session).require(&[]).await?;

    assert_eq!(context.user.id, member.user.id);
    assert_eq!(context.personnel_id(), member.personnel.id);
    assert_eq!(context.tenant_id, member.tenant.id);
    assert_eq!(context.role(), Role::Technician);
    assert_eq!(context.viewer(), Some(member.personnel.id));

    Ok(())
}

/// Tests that `require_user` only needs a logged-in user, not tenant membership.
///
/// Expected: Ok(User) even though the session has no tenant
#[tokio::test]
async fn require_user_ignores_tenant() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_member_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let user = factory::create_user(db).await?;
    AuthSession::new(session).set_user_id(user.id).await?;

    let resolved = AuthGuard::new(db, session).require_user().await?;

    assert_eq!(resolved.id, user.id);

    Ok(())
}
