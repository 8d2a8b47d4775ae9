//! Translation of pool and Diesel failures into [`PersistenceError`].

use std::str::FromStr;

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::PersistenceError;

use super::pool::PoolError;

pub(crate) fn map_pool_error(error: PoolError) -> PersistenceError {
    PersistenceError::connection(error.into_message())
}

/// Map a Diesel error, logging the driver detail at `debug` only.
pub(crate) fn map_diesel_error(error: DieselError) -> PersistenceError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), constraint = info.constraint_name(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => PersistenceError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            PersistenceError::duplicate(
                info.constraint_name()
                    .map_or_else(|| "unique constraint".to_owned(), str::to_owned),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PersistenceError::connection("database connection closed")
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
            PersistenceError::query(format!(
                "check constraint violated: {}",
                info.constraint_name().unwrap_or("unknown")
            ))
        }
        DieselError::QueryBuilderError(_) => PersistenceError::query("database query error"),
        _ => PersistenceError::query("database error"),
    }
}

impl From<DieselError> for PersistenceError {
    fn from(error: DieselError) -> Self {
        map_diesel_error(error)
    }
}

/// Parse a text column holding a domain enum.
pub(crate) fn parse_column<T: FromStr>(column: &str, value: &str) -> Result<T, PersistenceError> {
    value
        .parse()
        .map_err(|_| PersistenceError::query(format!("unrecognised {column} value {value:?}")))
}

/// Widen a row count for the pagination envelope.
pub(crate) fn total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Page offset as a SQL bind value.
pub(crate) fn offset(page: pagination::PageRequest) -> i64 {
    i64::try_from(page.offset()).unwrap_or(i64::MAX)
}

/// Page size as a SQL bind value.
pub(crate) fn limit(page: pagination::PageRequest) -> i64 {
    i64::from(page.limit())
}

/// `%term%` for `ILIKE`, with the pattern metacharacters escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
