use super::*;

/// Tests that a technician assigned to a task can access it.
///
/// Expected: Ok
#[tokio::test]
async fn allows_assignee() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_board_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member_with_role(db, "technician").await?;
    let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
    let task = factory::create_task(db, member.tenant.id, todo.id).await?;
    factory::task::assign(db, task.id, member.personnel.id).await?;
    AuthSession::new(session)
        .login(member.user.id, member.tenant.id)
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::TaskAccess(task.id)])
        .await;

    assert!(result.is_ok());

    Ok(())
}

/// Tests that crew membership on the task's work order grants access.
///
/// Expected: Ok without a direct assignment
#[tokio::test]
async fn allows_work_order_crew() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_board_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member_with_role(db, "technician").await?;
    let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
    let work_order = factory::create_work_order(db, member.tenant.id).await?;
    factory::work_order::assign_personnel(db, work_order.id, member.personnel.id).await?;
    let task = factory::task::TaskFactory::new(db, member.tenant.id, todo.id)
        .work_order_id(work_order.id)
        .build()
        .await?;
    AuthSession::new(session)
        .login(member.user.id, member.tenant.id)
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::TaskAccess(task.id)])
        .await;

    assert!(result.is_ok());

    Ok(())
}

/// Tests that an unrelated technician is denied.
///
/// Expected: Err(AuthError::AccessDenied)
#[tokio::test]
async fn denies_unassigned_technician() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_board_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member_with_role(db, "technician").await?;
    let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
    let task = factory::create_task(db, member.tenant.id, todo.id).await?;
    AuthSession::new(session)
        .login(member.user.id, member.tenant.id)
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::TaskAccess(task.id)])
        .await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
    ));

    Ok(())
}

/// Tests that managers access any task in their tenant.
///
/// Expected: Ok without assignment
#[tokio::test]
async fn allows_manager() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_board_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member_with_role(db, "manager").await?;
    let [todo, _, _] = factory::create_default_columns(db, member.tenant.id).await?;
    let task = factory::create_task(db, member.tenant.id, todo.id).await?;
    AuthSession::new(session)
        .login(member.user.id, member.tenant.id)
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::TaskAccess(task.id)])
        .await;

    assert!(result.is_ok());

    Ok(())
}

/// Tests that a task from another tenant looks missing, even to an owner.
///
/// Expected: Err(AppError::NotFound)
#[tokio::test]
async fn hides_other_tenant_task() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_board_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let member = factory::create_member(db).await?;
    let other = factory::create_member(db).await?;
    let [todo, _, _] = factory::create_default_columns(db, other.tenant.id).await?;
    let task = factory::create_task(db, other.tenant.id, todo.id).await?;
    AuthSession::new(session)
        .login(member.user.id, member.tenant.id)
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::TaskAccess(task.id)])
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}
