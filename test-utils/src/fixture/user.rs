use chrono::{TimeZone, Utc};
use entity::user;

pub const DEFAULT_EMAIL: &str = "dana@example.com";
pub const DEFAULT_NAME: &str = "Dana Field";

/// User with id 1, default email and name, and no phone.
pub fn entity() -> user::Model {
    user::Model {
        id: 1,
        email: DEFAULT_EMAIL.to_string(),
        name: DEFAULT_NAME.to_string(),
        phone: None,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        last_login_at: None,
    }
}
