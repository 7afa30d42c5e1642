//! Mapping from Diesel and pool errors to store errors.

use tracing::debug;

use crate::domain::ports::StoreError;

use super::pool::PoolError;

/// Map a pool failure to a store error.
pub(crate) fn map_pool_error(error: PoolError) -> StoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreError::connection(message)
        }
    }
}

/// Map a Diesel failure to a store error, classifying unique violations as
/// conflicts so the service layer can surface them under the taxonomy.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> StoreError {
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

    fn constraint_of(info: &(dyn DatabaseErrorInformation + Send + Sync)) -> &str {
        info.constraint_name().unwrap_or("unique constraint")
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let constraint = constraint_of(info.as_ref()).to_owned();
            debug!(%constraint, message = info.message(), "unique violation");
            StoreError::conflict(constraint)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            debug!(message = info.message(), "connection closed mid-operation");
            StoreError::connection("database connection error")
        }
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "database error");
            StoreError::query(info.message().to_owned())
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            StoreError::query(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_errors_become_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(mapped, StoreError::connection("timed out"));
    }

    #[test]
    fn not_found_becomes_query_error() {
        let mapped = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(mapped, StoreError::Query { .. }));
    }
}
