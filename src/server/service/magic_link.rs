//! Passwordless login through single-use magic links.
//!
//! A link is issued for a user within one tenant and for one purpose. Only the SHA-256
//! digest of its token is stored, so a leaked database cannot be replayed into sessions.
//! Consuming a link activates the user's personnel record, which is how invitations and
//! signup activation complete.

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::server::{
    config::Config,
    data::{
        magic_link::MagicLinkRepository, personnel::PersonnelRepository,
        tenant::TenantRepository, user::UserRepository,
    },
    error::{auth::AuthError, AppError},
    model::{
        magic_link::{IssuedMagicLink, MagicLinkPurpose},
        user::User,
    },
    service::delivery::DeliveryService,
    util::token::{generate_token, hash_token},
};

/// Links older than this past expiry or consumption are purged by the scheduler.
pub const PURGE_AFTER_HOURS: i64 = 24;

pub struct MagicLinkService<'a> {
    db: &'a DatabaseConnection,
    delivery: &'a DeliveryService,
    config: &'a Config,
}

impl<'a> MagicLinkService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        delivery: &'a DeliveryService,
        config: &'a Config,
    ) -> Self {
        Self {
            db,
            delivery,
            config,
        }
    }

    fn ttl(&self, purpose: MagicLinkPurpose) -> Duration {
        match purpose {
            MagicLinkPurpose::Invitation => self.config.invitation_ttl,
            MagicLinkPurpose::Login | MagicLinkPurpose::Activation => self.config.magic_link_ttl,
        }
    }

    /// Issues a new link, invalidating earlier unconsumed links of the same purpose.
    ///
    /// # Returns
    /// - `Ok(IssuedMagicLink)` - The plain token and its login URL
    /// - `Err(AppError::DbErr)` - Database error
    pub async fn issue(
        &self,
        tenant_id: i32,
        user_id: i32,
        purpose: MagicLinkPurpose,
    ) -> Result<IssuedMagicLink, AppError> {
        let repo = MagicLinkRepository::new(self.db);

        let replaced = repo.delete_unconsumed(tenant_id, user_id, purpose).await?;
        if replaced > 0 {
            tracing::debug!(tenant_id, user_id, %purpose, replaced, "Replaced unused magic links");
        }

        let token = generate_token();
        let expires_at = Utc::now() + self.ttl(purpose);
        repo.create(tenant_id, user_id, hash_token(&token), purpose, expires_at)
            .await?;

        let url = format!("{}/api/auth/magic-link/{}", self.config.app_url, token);

        Ok(IssuedMagicLink {
            token,
            url,
            expires_at,
        })
    }

    /// Issues a link and emails it to the user.
    ///
    /// Delivery failures are logged; the link stays valid and can be re-requested.
    pub async fn send(
        &self,
        tenant_id: i32,
        tenant_name: &str,
        user: &User,
        purpose: MagicLinkPurpose,
    ) -> Result<IssuedMagicLink, AppError> {
        let link = self.issue(tenant_id, user.id, purpose).await?;

        let (subject, intro) = match purpose {
            MagicLinkPurpose::Login => (
                format!("Sign in to {}", tenant_name),
                "Use the link below to sign in.",
            ),
            MagicLinkPurpose::Activation => (
                format!("Activate {}", tenant_name),
                "Your organization is ready. Use the link below to activate your account.",
            ),
            MagicLinkPurpose::Invitation => (
                format!("You have been invited to {}", tenant_name),
                "Use the link below to accept the invitation.",
            ),
        };
        let body = format!(
            "Hi {},\n\n{}\n\n{}\n\nThis link expires at {} UTC and can be used once.",
            user.name,
            intro,
            link.url,
            link.expires_at.format("%Y-%m-%d %H:%M")
        );

        if let Err(e) = self.delivery.send_email(&user.email, &subject, &body).await {
            tracing::error!(user_id = user.id, %purpose, "Failed to email magic link: {}", e);
        }

        Ok(link)
    }

    /// Handles a public login link request.
    ///
    /// Sends a login link only when the email belongs to active personnel of the tenant.
    /// The outcome is never reported to the caller.
    pub async fn request_login(&self, email: &str, tenant_slug: &str) -> Result<(), AppError> {
        let Some(tenant) = TenantRepository::new(self.db)
            .find_by_slug(tenant_slug.trim())
            .await?
        else {
            tracing::debug!(tenant_slug, "Login link requested for unknown tenant");
            return Ok(());
        };

        let Some(user) = UserRepository::new(self.db).find_by_email(email).await? else {
            tracing::debug!(tenant_id = tenant.id, "Login link requested for unknown email");
            return Ok(());
        };

        let personnel = PersonnelRepository::new(self.db)
            .find_by_user(tenant.id, user.id)
            .await?;
        if !personnel.is_some_and(|p| p.active) {
            tracing::debug!(
                tenant_id = tenant.id,
                user_id = user.id,
                "Login link requested by non-member"
            );
            return Ok(());
        }

        self.send(tenant.id, &tenant.name, &user, MagicLinkPurpose::Login)
            .await?;

        Ok(())
    }

    /// Consumes a token and logs its user into the link's tenant.
    ///
    /// # Returns
    /// - `Ok((User, tenant_id))` - The user, with the login time updated
    /// - `Err(AuthError::MagicLinkInvalid)` - Unknown, already used, or membership removed
    /// - `Err(AuthError::MagicLinkExpired)` - TTL passed
    pub async fn consume(&self, token: &str) -> Result<(User, i32), AppError> {
        let repo = MagicLinkRepository::new(self.db);
        let now = Utc::now();

        let link = repo
            .find_by_hash(&hash_token(token))
            .await?
            .ok_or(AuthError::MagicLinkInvalid)?;

        if link.consumed_at.is_some() {
            return Err(AuthError::MagicLinkInvalid.into());
        }
        if link.is_expired(now) {
            return Err(AuthError::MagicLinkExpired.into());
        }

        // Conditional update; a concurrent request for the same token loses here.
        if !repo.consume(link.id, now).await? {
            return Err(AuthError::MagicLinkInvalid.into());
        }

        let personnel_repo = PersonnelRepository::new(self.db);
        let personnel = personnel_repo
            .find_by_user(link.tenant_id, link.user_id)
            .await?
            .ok_or(AuthError::MagicLinkInvalid)?;
        if !personnel.active {
            personnel_repo.activate(personnel.id).await?;
            tracing::info!(
                tenant_id = link.tenant_id,
                personnel_id = personnel.id,
                purpose = %link.purpose,
                "Personnel activated"
            );
        }

        let user_repo = UserRepository::new(self.db);
        user_repo.update_last_login(link.user_id, now).await?;
        let user = user_repo
            .find_by_id(link.user_id)
            .await?
            .ok_or(AuthError::UserNotInDatabase(link.user_id))?;

        Ok((user, link.tenant_id))
    }

    /// Deletes links that expired or were consumed more than a day ago.
    pub async fn purge(&self) -> Result<u64, AppError> {
        let cutoff = Utc::now() - Duration::hours(PURGE_AFTER_HOURS);

        Ok(MagicLinkRepository::new(self.db).purge(cutoff).await?)
    }
}
