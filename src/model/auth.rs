use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{personnel::Role, tenant::TenantDto};

/// Public signup: creates a tenant and its first owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupDto {
    pub tenant_name: String,
    pub owner_name: String,
    pub owner_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MagicLinkRequestDto {
    pub email: String,
    pub tenant_slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
}

/// The authenticated user within the active tenant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUserDto {
    pub user: UserDto,
    pub tenant: TenantDto,
    pub personnel_id: i32,
    pub role: Role,
}
