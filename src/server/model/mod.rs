//! Domain models and operation parameters.
//!
//! Entities are converted into these types at the repository boundary so services and
//! controllers never see raw SeaORM models. Each type knows how to turn itself into its
//! wire DTO.

pub mod attachment;
pub mod calendar;
pub mod check_in;
pub mod client;
pub mod magic_link;
pub mod notification;
pub mod personnel;
pub mod status;
pub mod task;
pub mod tenant;
pub mod user;
pub mod work_order;

use std::str::FromStr;

use sea_orm::DbErr;

/// Number of pages needed for `total` items at `per_page` each.
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    if per_page > 0 {
        total.div_ceil(per_page)
    } else {
        0
    }
}

/// Parses a stored enum column, reporting unknown values as a database error.
pub(crate) fn parse_column<T: FromStr>(column: &str, value: &str) -> Result<T, DbErr> {
    value
        .parse()
        .map_err(|_| DbErr::Custom(format!("Failed to parse {}: '{}'", column, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::personnel::Role;

    #[test]
    fn computes_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn rejects_unknown_enum_values() {
        assert_eq!(parse_column::<Role>("role", "owner").unwrap(), Role::Owner);
        assert!(matches!(
            parse_column::<Role>("role", "overlord"),
            Err(DbErr::Custom(_))
        ));
    }
}
