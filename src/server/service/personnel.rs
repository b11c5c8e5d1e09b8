//! Tenant membership management.
//!
//! Owners are special: only an owner may grant, revoke or invite the owner role, and the
//! tenant must always keep at least one owner.

use sea_orm::DatabaseConnection;

use crate::{
    model::{notification::NotificationKind, personnel::Role},
    server::{
        data::{personnel::PersonnelRepository, tenant::TenantRepository, user::UserRepository},
        error::{auth::AuthError, AppError},
        model::{
            magic_link::MagicLinkPurpose,
            notification::NewNotification,
            personnel::{
                InvitePersonnelParams, PaginatedPersonnel, Personnel, UpdatePersonnelParams,
            },
            total_pages,
        },
        realtime::{RealtimeHub, Room},
        service::{magic_link::MagicLinkService, notification::NotificationService},
    },
};

pub struct PersonnelService<'a> {
    db: &'a DatabaseConnection,
    realtime: &'a RealtimeHub,
}

impl<'a> PersonnelService<'a> {
    pub fn new(db: &'a DatabaseConnection, realtime: &'a RealtimeHub) -> Self {
        Self { db, realtime }
    }

    pub async fn get_paginated(
        &self,
        tenant_id: i32,
        page: u64,
        per_page: u64,
    ) -> Result<PaginatedPersonnel, AppError> {
        let (personnel, total) = PersonnelRepository::new(self.db)
            .get_paginated(tenant_id, page, per_page)
            .await?;

        Ok(PaginatedPersonnel {
            personnel,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    /// Loads personnel of the tenant by id, failing if any id is unknown.
    ///
    /// Duplicate ids are collapsed.
    ///
    /// # Returns
    /// - `Ok(Vec<Personnel>)` - One entry per distinct id
    /// - `Err(AppError::BadRequest)` - An id is not personnel of the tenant
    pub async fn resolve(&self, tenant_id: i32, ids: &[i32]) -> Result<Vec<Personnel>, AppError> {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found = PersonnelRepository::new(self.db)
            .get_by_ids(tenant_id, &ids)
            .await?;
        if found.len() != ids.len() {
            let missing: Vec<String> = ids
                .iter()
                .filter(|id| !found.iter().any(|p| p.id == **id))
                .map(|id| id.to_string())
                .collect();
            return Err(AppError::BadRequest(format!(
                "Unknown personnel: {}",
                missing.join(", ")
            )));
        }

        Ok(found)
    }

    /// Invites a user into the tenant.
    ///
    /// Creates the user when the email is new and an inactive personnel record, then sends
    /// an invitation link. The record activates when the link is used.
    ///
    /// # Returns
    /// - `Ok(Personnel)` - The inactive personnel record
    /// - `Err(AppError::BadRequest)` - Missing name or malformed email
    /// - `Err(AppError::Conflict)` - The user is already personnel of the tenant
    /// - `Err(AuthError::AccessDenied)` - A non-owner tried to invite an owner
    pub async fn invite(
        &self,
        actor: &Personnel,
        params: InvitePersonnelParams,
        links: &MagicLinkService<'_>,
    ) -> Result<Personnel, AppError> {
        let tenant_id = actor.tenant_id;
        if params.role == Role::Owner && actor.role != Role::Owner {
            return Err(AuthError::AccessDenied(
                actor.user_id,
                "only owners may invite owners".to_string(),
            )
            .into());
        }
        if params.name.trim().is_empty() {
            return Err(AppError::BadRequest("Name is required".to_string()));
        }
        if !params.email.contains('@') {
            return Err(AppError::BadRequest("A valid email is required".to_string()));
        }

        let user = UserRepository::new(self.db)
            .find_or_create(&params.email, params.name.trim().to_string(), params.phone)
            .await?;

        let personnel_repo = PersonnelRepository::new(self.db);
        if personnel_repo.find_by_user(tenant_id, user.id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "{} is already a member of this organization",
                user.email
            )));
        }

        let created = personnel_repo
            .create(tenant_id, user.id, params.role, params.title, false)
            .await?;
        let personnel = personnel_repo
            .find_by_id(tenant_id, created.id)
            .await?
            .ok_or_else(|| AppError::InternalError("Invited personnel vanished".to_string()))?;

        let tenant = TenantRepository::new(self.db)
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;
        links
            .send(tenant_id, &tenant.name, &user, MagicLinkPurpose::Invitation)
            .await?;

        NotificationService::new(self.db, self.realtime)
            .notify_or_log(
                tenant_id,
                &[personnel.id],
                Some(actor.id),
                &NewNotification {
                    kind: NotificationKind::Invitation,
                    title: format!("Welcome to {}", tenant.name),
                    body: format!("{} invited you as {}", actor.name, personnel.role),
                    task_id: None,
                    work_order_id: None,
                },
            )
            .await;

        tracing::info!(
            tenant_id,
            personnel_id = personnel.id,
            role = %personnel.role,
            "Personnel invited"
        );
        Ok(personnel)
    }

    /// Changes a member's role and title.
    ///
    /// # Returns
    /// - `Ok(Personnel)` - The updated record
    /// - `Err(AppError::NotFound)` - Not in the tenant
    /// - `Err(AuthError::AccessDenied)` - A non-owner touched the owner role
    /// - `Err(AppError::Conflict)` - Demoting the last owner
    pub async fn update(
        &self,
        actor: &Personnel,
        id: i32,
        params: UpdatePersonnelParams,
    ) -> Result<Personnel, AppError> {
        let tenant_id = actor.tenant_id;
        let repo = PersonnelRepository::new(self.db);
        let target = repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Personnel not found".to_string()))?;

        let touches_owner = target.role == Role::Owner || params.role == Role::Owner;
        if touches_owner && target.role != params.role && actor.role != Role::Owner {
            return Err(AuthError::AccessDenied(
                actor.user_id,
                "only owners may grant or revoke owner".to_string(),
            )
            .into());
        }

        if target.role == Role::Owner
            && params.role != Role::Owner
            && repo.count_owners(tenant_id).await? <= 1
        {
            return Err(AppError::Conflict(
                "The last owner cannot be demoted".to_string(),
            ));
        }

        repo.update(id, params.role, params.title).await?;
        let updated = repo
            .find_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Personnel not found".to_string()))?;

        self.realtime.publish(
            tenant_id,
            Room::Tenant,
            "personnel.updated",
            &updated.clone().into_dto(),
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{config::Config, service::delivery::DeliveryService};
    use test_utils::{builder::TestBuilder, factory};

    async fn actor(db: &DatabaseConnection, role: &str) -> Result<Personnel, AppError> {
        let member = factory::create_member_with_role(db, role).await?;
        Ok(PersonnelRepository::new(db)
            .find_by_id(member.tenant.id, member.personnel.id)
            .await?
            .unwrap())
    }

    fn invite(email: &str, role: Role) -> InvitePersonnelParams {
        InvitePersonnelParams {
            email: email.to_string(),
            name: "Sam Rivera".to_string(),
            phone: None,
            role,
            title: Some("Electrician".to_string()),
        }
    }

    /// Tests inviting a new user.
    ///
    /// Expected: inactive personnel and an invitation link stored
    #[tokio::test]
    async fn invites_inactive_personnel() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let (realtime, config) = (RealtimeHub::new(), Config::for_tests());
        let delivery = DeliveryService::new(reqwest::Client::new(), None, Vec::new());
        let links = MagicLinkService::new(db, &delivery, &config);

        let admin = actor(db, "admin").await?;
        let invited = PersonnelService::new(db, &realtime)
            .invite(&admin, invite("sam@example.com", Role::Technician), &links)
            .await?;

        assert!(!invited.active);
        assert_eq!(invited.role, Role::Technician);
        assert_eq!(invited.email, "sam@example.com");

        let duplicate = PersonnelService::new(db, &realtime)
            .invite(&admin, invite("SAM@example.com", Role::Technician), &links)
            .await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        Ok(())
    }

    /// Tests that only owners may invite owners.
    ///
    /// Expected: AccessDenied for an admin
    #[tokio::test]
    async fn admin_cannot_invite_owner() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let (realtime, config) = (RealtimeHub::new(), Config::for_tests());
        let delivery = DeliveryService::new(reqwest::Client::new(), None, Vec::new());
        let links = MagicLinkService::new(db, &delivery, &config);

        let admin = actor(db, "admin").await?;
        let result = PersonnelService::new(db, &realtime)
            .invite(&admin, invite("boss@example.com", Role::Owner), &links)
            .await;

        assert!(matches!(
            result,
            Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
        ));

        Ok(())
    }

    /// Tests that the sole owner cannot demote themselves.
    ///
    /// Expected: Conflict, and the role is unchanged
    #[tokio::test]
    async fn cannot_demote_last_owner() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let owner = actor(db, "owner").await?;
        let result = PersonnelService::new(db, &realtime)
            .update(
                &owner,
                owner.id,
                UpdatePersonnelParams {
                    role: Role::Admin,
                    title: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));

        Ok(())
    }

    /// Tests demoting the only active owner while a second owner is still invited.
    ///
    /// Expected: Conflict, since the invited owner cannot sign in
    #[tokio::test]
    async fn invited_owner_does_not_count_toward_last_owner() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let (realtime, config) = (RealtimeHub::new(), Config::for_tests());
        let delivery = DeliveryService::new(reqwest::Client::new(), None, Vec::new());
        let links = MagicLinkService::new(db, &delivery, &config);
        let service = PersonnelService::new(db, &realtime);

        let owner = actor(db, "owner").await?;
        let invited = service
            .invite(&owner, invite("partner@example.com", Role::Owner), &links)
            .await?;
        assert!(!invited.active);

        let result = service
            .update(
                &owner,
                owner.id,
                UpdatePersonnelParams {
                    role: Role::Admin,
                    title: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        let unchanged = PersonnelRepository::new(db)
            .find_by_id(owner.tenant_id, owner.id)
            .await?
            .unwrap();
        assert_eq!(unchanged.role, Role::Owner);

        Ok(())
    }

    /// Tests an admin demoting one of two owners.
    ///
    /// Expected: AccessDenied, and the owner keeps the role
    #[tokio::test]
    async fn admin_cannot_change_owner_role() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let owner = actor(db, "owner").await?;
        factory::helpers::add_member(db, owner.tenant_id, "owner").await?;
        let (_, admin) = factory::helpers::add_member(db, owner.tenant_id, "admin").await?;
        let admin = PersonnelRepository::new(db)
            .find_by_id(owner.tenant_id, admin.id)
            .await?
            .unwrap();

        let result = PersonnelService::new(db, &realtime)
            .update(
                &admin,
                owner.id,
                UpdatePersonnelParams {
                    role: Role::Technician,
                    title: None,
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(AppError::AuthErr(AuthError::AccessDenied(_, _)))
        ));
        let unchanged = PersonnelRepository::new(db)
            .find_by_id(owner.tenant_id, owner.id)
            .await?
            .unwrap();
        assert_eq!(unchanged.role, Role::Owner);

        Ok(())
    }

    /// Tests resolving a mix of known and foreign personnel ids.
    ///
    /// Expected: BadRequest naming the foreign id
    #[tokio::test]
    async fn resolve_rejects_foreign_ids() -> Result<(), AppError> {
        let test = TestBuilder::new().with_all_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let realtime = RealtimeHub::new();

        let member = factory::create_member(db).await?;
        let other = factory::create_member(db).await?;
        let service = PersonnelService::new(db, &realtime);

        let ok = service
            .resolve(member.tenant.id, &[member.personnel.id, member.personnel.id])
            .await?;
        assert_eq!(ok.len(), 1);

        let result = service
            .resolve(member.tenant.id, &[member.personnel.id, other.personnel.id])
            .await;
        match result {
            Err(AppError::BadRequest(msg)) => {
                assert!(msg.contains(&other.personnel.id.to_string()))
            }
            other => panic!("expected BadRequest, got {:?}", other.map(|v| v.len())),
        }

        Ok(())
    }
}
