//! Shared factory utilities: unique ids and whole-member setup.

use sea_orm::{DatabaseConnection, DbErr};

static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// Monotonically increasing value used to keep names, emails and slugs unique.
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// A tenant together with one of its members.
pub struct Member {
    pub tenant: entity::tenant::Model,
    pub user: entity::user::Model,
    pub personnel: entity::personnel::Model,
}

/// Creates a tenant, a user and an active `owner` personnel record linking them.
///
/// # Returns
/// - `Ok(Member)` - The created tenant, user and personnel
/// - `Err(DbErr)` - Insert failed
pub async fn create_member(db: &DatabaseConnection) -> Result<Member, DbErr> {
    create_member_with_role(db, "owner").await
}

/// Creates a tenant and a member holding `role`.
pub async fn create_member_with_role(
    db: &DatabaseConnection,
    role: &str,
) -> Result<Member, DbErr> {
    let tenant = crate::factory::tenant::create_tenant(db).await?;
    let (user, personnel) = add_member(db, tenant.id, role).await?;

    Ok(Member {
        tenant,
        user,
        personnel,
    })
}

/// Adds a new user to an existing tenant with the given role.
///
/// # Returns
/// - `Ok((user, personnel))` - The created user and its active personnel record
/// - `Err(DbErr)` - Insert failed
pub async fn add_member(
    db: &DatabaseConnection,
    tenant_id: i32,
    role: &str,
) -> Result<(entity::user::Model, entity::personnel::Model), DbErr> {
    let user = crate::factory::user::create_user(db).await?;
    let personnel = crate::factory::personnel::PersonnelFactory::new(db, tenant_id, user.id)
        .role(role)
        .build()
        .await?;

    Ok((user, personnel))
}
