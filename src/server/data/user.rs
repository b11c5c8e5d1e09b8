//! User data repository for database operations.
//!
//! Users are global and keyed by a normalized email address. Tenant membership is handled
//! by the personnel repository.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};

use crate::server::model::user::{normalize_email, User};

pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// - `db` - Reference to the database connection
    ///
    /// # Returns
    /// - `UserRepository` - New repository instance
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by id.
    ///
    /// # Returns
    /// - `Ok(Some(User))` - User found
    /// - `Ok(None)` - No user with that id
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, DbErr> {
        let entity = entity::prelude::User::find_by_id(id).one(self.db).await?;

        Ok(entity.map(User::from_entity))
    }

    /// Finds a user by email, ignoring case and surrounding whitespace.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbErr> {
        let entity = entity::prelude::User::find()
            .filter(entity::user::Column::Email.eq(normalize_email(email)))
            .one(self.db)
            .await?;

        Ok(entity.map(User::from_entity))
    }

    /// Returns the user with `email`, creating one when none exists.
    ///
    /// An existing user keeps their name and phone; the provided values only apply to a
    /// newly created record.
    ///
    /// # Returns
    /// - `Ok(User)` - Existing or created user
    /// - `Err(DbErr)` - Database error during lookup or insert
    pub async fn find_or_create(
        &self,
        email: &str,
        name: String,
        phone: Option<String>,
    ) -> Result<User, DbErr> {
        if let Some(user) = self.find_by_email(email).await? {
            return Ok(user);
        }

        let entity = entity::user::ActiveModel {
            email: ActiveValue::Set(normalize_email(email)),
            name: ActiveValue::Set(name),
            phone: ActiveValue::Set(phone),
            created_at: ActiveValue::Set(Utc::now()),
            last_login_at: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(self.db)
        .await?;

        Ok(User::from_entity(entity))
    }

    /// Records a successful magic-link login.
    pub async fn update_last_login(&self, id: i32, at: DateTime<Utc>) -> Result<(), DbErr> {
        entity::prelude::User::update_many()
            .filter(entity::user::Column::Id.eq(id))
            .col_expr(
                entity::user::Column::LastLoginAt,
                sea_orm::sea_query::Expr::value(at),
            )
            .exec(self.db)
            .await?;
        Ok(())
    }
}
