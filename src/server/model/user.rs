//! User domain model.
//!
//! A user is a global identity keyed by email. Membership in a tenant, and the role held
//! there, lives on the personnel record.

use chrono::{DateTime, Utc};

use crate::model::auth::UserDto;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Converts the user domain model to a DTO for API responses.
    pub fn into_dto(self) -> UserDto {
        UserDto {
            id: self.id,
            email: self.email,
            name: self.name,
            phone: self.phone,
        }
    }

    /// Converts an entity model to a user domain model at the repository boundary.
    pub fn from_entity(entity: entity::user::Model) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            name: entity.name,
            phone: entity.phone,
            last_login_at: entity.last_login_at,
        }
    }
}

/// Emails are matched case-insensitively and stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
