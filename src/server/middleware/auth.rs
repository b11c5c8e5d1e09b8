//! Authentication and permission guard.
//!
//! Every protected handler starts with `AuthGuard::require`, which resolves the session
//! into an [`AuthContext`]: the user, their active personnel record in the session's
//! tenant, and the tenant id. Permissions are checked in order and the first failure is
//! returned.
//!
//! Task and work order permissions double as tenant-scoped existence checks: an id that is
//! missing or belongs to another tenant yields `NotFound` before any role check.

use sea_orm::DatabaseConnection;
use tower_sessions::Session;

use crate::{
    model::personnel::Role,
    server::{
        data::{
            personnel::PersonnelRepository, task::TaskRepository, user::UserRepository,
            work_order::WorkOrderRepository, work_order_personnel::WorkOrderPersonnelRepository,
        },
        error::{auth::AuthError, AppError},
        middleware::session::AuthSession,
        model::{personnel::Personnel, user::User},
    },
};

pub enum Permission {
    /// Role at or above the given one.
    MinRole(Role),
    /// View or edit a task: manager+, an assignee, or on the work order crew.
    TaskAccess(i32),
    /// View a work order: manager+ or on its crew.
    WorkOrderView(i32),
}

/// The authenticated caller within their active tenant.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub personnel: Personnel,
    pub tenant_id: i32,
}

impl AuthContext {
    pub fn role(&self) -> Role {
        self.personnel.role
    }

    pub fn personnel_id(&self) -> i32 {
        self.personnel.id
    }

    pub fn is_manager(&self) -> bool {
        self.personnel.role >= Role::Manager
    }

    /// Visibility restriction for listings: `None` for managers, the personnel id otherwise.
    pub fn viewer(&self) -> Option<i32> {
        if self.is_manager() {
            None
        } else {
            Some(self.personnel.id)
        }
    }
}

pub struct AuthGuard<'a> {
    db: &'a DatabaseConnection,
    session: &'a Session,
}

impl<'a> AuthGuard<'a> {
    pub fn new(db: &'a DatabaseConnection, session: &'a Session) -> Self {
        Self { db, session }
    }

    /// Resolves the logged-in user without requiring tenant membership.
    ///
    /// # Returns
    /// - `Ok(User)` - The session's user
    /// - `Err(AuthError::UserNotInSession)` - Not logged in
    /// - `Err(AuthError::UserNotInDatabase)` - Session refers to a deleted user
    pub async fn require_user(&self) -> Result<User, AppError> {
        let Some(user_id) = AuthSession::new(self.session).get_user_id().await? else {
            return Err(AuthError::UserNotInSession.into());
        };

        let Some(user) = UserRepository::new(self.db).find_by_id(user_id).await? else {
            return Err(AuthError::UserNotInDatabase(user_id).into());
        };

        Ok(user)
    }

    /// Resolves the caller and checks every permission.
    ///
    /// # Arguments
    /// - `permissions` - Checked in order; an empty slice only requires active membership
    ///
    /// # Returns
    /// - `Ok(AuthContext)` - Caller passed all checks
    /// - `Err(AuthError::NotTenantMember)` - No active personnel record in the tenant
    /// - `Err(AuthError::AccessDenied)` - A permission check failed
    /// - `Err(AppError::NotFound)` - Task or work order is not in the tenant
    pub async fn require(&self, permissions: &[Permission]) -> Result<AuthContext, AppError> {
        let user = self.require_user().await?;

        let Some(tenant_id) = AuthSession::new(self.session).get_tenant_id().await? else {
            return Err(AuthError::UserNotInSession.into());
        };

        let personnel = PersonnelRepository::new(self.db)
            .find_by_user(tenant_id, user.id)
            .await?
            .filter(|p| p.active)
            .ok_or(AuthError::NotTenantMember(user.id, tenant_id))?;

        let context = AuthContext {
            user,
            personnel,
            tenant_id,
        };

        for permission in permissions {
            match permission {
                Permission::MinRole(role) => {
                    if context.role() < *role {
                        return Err(AuthError::AccessDenied(
                            context.user.id,
                            format!("requires role {} but has {}", role, context.role()),
                        )
                        .into());
                    }
                }
                Permission::TaskAccess(task_id) => self.check_task(&context, *task_id).await?,
                Permission::WorkOrderView(work_order_id) => {
                    self.check_work_order(&context, *work_order_id).await?
                }
            }
        }

        Ok(context)
    }

    async fn check_task(&self, context: &AuthContext, task_id: i32) -> Result<(), AppError> {
        let task_repo = TaskRepository::new(self.db);

        if task_repo
            .find_by_id(context.tenant_id, task_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Task not found".to_string()));
        }

        if context.is_manager() || task_repo.is_visible_to(task_id, context.personnel_id()).await?
        {
            return Ok(());
        }

        Err(AuthError::AccessDenied(
            context.user.id,
            format!("not assigned to task {}", task_id),
        )
        .into())
    }

    async fn check_work_order(
        &self,
        context: &AuthContext,
        work_order_id: i32,
    ) -> Result<(), AppError> {
        if WorkOrderRepository::new(self.db)
            .find_by_id(context.tenant_id, work_order_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Work order not found".to_string()));
        }

        if context.is_manager() {
            return Ok(());
        }

        let crew = WorkOrderPersonnelRepository::new(self.db)
            .get_personnel_ids(work_order_id)
            .await?;
        if crew.contains(&context.personnel_id()) {
            return Ok(());
        }

        Err(AuthError::AccessDenied(
            context.user.id,
            format!("not on the crew of work order {}", work_order_id),
        )
        .into())
    }
}
