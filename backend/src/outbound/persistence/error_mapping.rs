//! Translation of pool and Diesel failures into repository port errors.
//!
//! Driver messages are logged at debug level and replaced with a short
//! category so SQL text and constraint names never reach HTTP responses.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{ScheduleRepositoryError, UserPersistenceError};

use super::pool::PoolError;

/// Port error types with connection and query variants.
pub(super) trait RepositoryFailure {
    fn connection(message: String) -> Self;
    fn query(message: String) -> Self;
}

impl RepositoryFailure for ScheduleRepositoryError {
    fn connection(message: String) -> Self {
        Self::connection(message)
    }

    fn query(message: String) -> Self {
        Self::query(message)
    }
}

impl RepositoryFailure for UserPersistenceError {
    fn connection(message: String) -> Self {
        Self::connection(message)
    }

    fn query(message: String) -> Self {
        Self::query(message)
    }
}

/// A failed checkout always means the database is unreachable.
pub(super) fn pool_failure<E: RepositoryFailure>(error: PoolError) -> E {
    E::connection(error.message().to_owned())
}

/// Classify a Diesel error.
pub(super) fn diesel_failure<E: RepositoryFailure>(error: DieselError) -> E {
    let category = match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "database statement failed");
            match kind {
                DatabaseErrorKind::ClosedConnection => {
                    return E::connection("database connection closed".to_owned());
                }
                DatabaseErrorKind::ForeignKeyViolation => "referenced row does not exist",
                DatabaseErrorKind::UniqueViolation => "row already exists",
                DatabaseErrorKind::SerializationFailure => "concurrent update conflict",
                _ => "database error",
            }
        }
        DieselError::NotFound => "row not found",
        DieselError::RollbackTransaction | DieselError::RollbackErrorOnCommit { .. } => {
            debug!(%error, "transaction rolled back");
            "transaction rolled back"
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            "database error"
        }
    };
    E::query(category.to_owned())
}
