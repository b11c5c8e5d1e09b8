//! Personnel domain models.
//!
//! Personnel ties a user to a tenant with a role. Most of the API addresses people by
//! personnel id, so summaries carry the user's display name along with it.

use chrono::{DateTime, Utc};
use sea_orm::DbErr;

use crate::{
    model::personnel::{
        InvitePersonnelDto, PaginatedPersonnelDto, PersonnelDto, PersonnelSummaryDto, Role,
        UpdatePersonnelDto,
    },
    server::model::parse_column,
};

/// A member of a tenant together with their user profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Personnel {
    pub id: i32,
    pub tenant_id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub title: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Personnel {
    /// Builds the domain model from the personnel row and its user.
    ///
    /// # Returns
    /// - `Ok(Personnel)` - Converted model
    /// - `Err(DbErr::Custom)` - Stored role is not a known role
    pub fn from_entity(
        personnel: entity::personnel::Model,
        user: entity::user::Model,
    ) -> Result<Self, DbErr> {
        Ok(Self {
            id: personnel.id,
            tenant_id: personnel.tenant_id,
            user_id: personnel.user_id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: parse_column("personnel.role", &personnel.role)?,
            title: personnel.title,
            active: personnel.active,
            created_at: personnel.created_at,
        })
    }

    pub fn summary(&self) -> PersonnelSummary {
        PersonnelSummary {
            personnel_id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn into_dto(self) -> PersonnelDto {
        PersonnelDto {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            role: self.role,
            title: self.title,
            active: self.active,
            created_at: self.created_at,
        }
    }
}

/// Personnel id with display name, used for assignees and crews.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonnelSummary {
    pub personnel_id: i32,
    pub name: String,
}

impl PersonnelSummary {
    pub fn into_dto(self) -> PersonnelSummaryDto {
        PersonnelSummaryDto {
            personnel_id: self.personnel_id,
            name: self.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedPersonnel {
    pub personnel: Vec<Personnel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl PaginatedPersonnel {
    pub fn into_dto(self) -> PaginatedPersonnelDto {
        PaginatedPersonnelDto {
            personnel: self.personnel.into_iter().map(Personnel::into_dto).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InvitePersonnelParams {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub title: Option<String>,
}

impl InvitePersonnelParams {
    pub fn from_dto(dto: InvitePersonnelDto) -> Self {
        Self {
            email: dto.email,
            name: dto.name,
            phone: dto.phone,
            role: dto.role,
            title: dto.title,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdatePersonnelParams {
    pub role: Role,
    pub title: Option<String>,
}

impl UpdatePersonnelParams {
    pub fn from_dto(dto: UpdatePersonnelDto) -> Self {
        Self {
            role: dto.role,
            title: dto.title,
        }
    }
}
