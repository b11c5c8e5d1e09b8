use sea_orm::DatabaseConnection;

use crate::{
    model::{auth::SignupDto, personnel::Role},
    server::{
        data::{
            personnel::PersonnelRepository, status::StatusRepository, tenant::TenantRepository,
            user::UserRepository,
        },
        error::AppError,
        model::{
            magic_link::MagicLinkPurpose,
            status::{CreateStatusParams, DEFAULT_COLOR, DEFAULT_COLUMNS},
            tenant::Tenant,
        },
        service::magic_link::MagicLinkService,
        util::slug::{slugify, with_suffix},
    },
};

const MAX_SLUG_ATTEMPTS: u32 = 100;

pub struct TenantService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TenantService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a tenant with its owner and default board, then emails an activation link.
    ///
    /// An existing user with the same email becomes the owner instead of a new account.
    ///
    /// # Returns
    /// - `Ok(Tenant)` - The created tenant
    /// - `Err(AppError::BadRequest)` - Missing names or malformed email
    /// - `Err(AppError::Conflict)` - No free slug could be derived from the name
    pub async fn signup(
        &self,
        signup: SignupDto,
        links: &MagicLinkService<'_>,
    ) -> Result<Tenant, AppError> {
        let tenant_name = signup.tenant_name.trim();
        let owner_name = signup.owner_name.trim();
        if tenant_name.is_empty() || owner_name.is_empty() {
            return Err(AppError::BadRequest(
                "Organization and owner names are required".to_string(),
            ));
        }
        if !signup.owner_email.contains('@') {
            return Err(AppError::BadRequest("A valid email is required".to_string()));
        }

        let tenant_repo = TenantRepository::new(self.db);
        let base = slugify(tenant_name);
        let mut slug = None;
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = with_suffix(&base, attempt);
            if !tenant_repo.slug_exists(&candidate).await? {
                slug = Some(candidate);
                break;
            }
        }
        let slug = slug.ok_or_else(|| {
            AppError::Conflict(format!("No free slug for organization '{}'", tenant_name))
        })?;

        let tenant = tenant_repo.create(tenant_name.to_string(), slug).await?;
        let user = UserRepository::new(self.db)
            .find_or_create(&signup.owner_email, owner_name.to_string(), None)
            .await?;
        PersonnelRepository::new(self.db)
            .create(tenant.id, user.id, Role::Owner, None, true)
            .await?;

        let status_repo = StatusRepository::new(self.db);
        for (name, is_completed) in DEFAULT_COLUMNS {
            status_repo
                .create(
                    tenant.id,
                    CreateStatusParams {
                        name: name.to_string(),
                        color: DEFAULT_COLOR.to_string(),
                        is_completed,
                    },
                )
                .await?;
        }

        links
            .send(tenant.id, &tenant.name, &user, MagicLinkPurpose::Activation)
            .await?;

        tracing::info!(tenant_id = tenant.id, slug = %tenant.slug, "Tenant signed up");
        Ok(tenant)
    }

    pub async fn get(&self, tenant_id: i32) -> Result<Tenant, AppError> {
        TenantRepository::new(self.db)
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))
    }

    /// Renames the tenant and sets its IANA timezone name.
    pub async fn update(
        &self,
        tenant_id: i32,
        name: &str,
        timezone: &str,
    ) -> Result<Tenant, AppError> {
        let (name, timezone) = (name.trim(), timezone.trim());
        if name.is_empty() || timezone.is_empty() {
            return Err(AppError::BadRequest(
                "Name and timezone are required".to_string(),
            ));
        }
        self.get(tenant_id).await?;

        Ok(TenantRepository::new(self.db)
            .update(tenant_id, name.to_string(), timezone.to_string())
            .await?)
    }
}
