//! Shared Diesel failure classification for the repository adapters.
//!
//! Each adapter turns a [`DieselFailure`] into its own port error, so the
//! constraint names from the migrations are interpreted in one place.

use tracing::debug;

use super::pool::PoolError;

/// Unique constraint guarding account e-mail addresses.
pub(super) const USERS_EMAIL_KEY: &str = "users_email_key";
/// Unique constraint guarding account phone numbers.
pub(super) const USERS_PHONE_KEY: &str = "users_phone_key";
/// Unique constraint guarding listing contact numbers.
pub(super) const RESTAURANTS_CONTACT_KEY: &str = "restaurants_contact_key";

/// Adapter-neutral view of a failed Diesel call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key rejected the write.
    ForeignKeyViolation { constraint: Option<String> },
    /// Anything else.
    Query(String),
}

/// Extract a readable message from a pool error.
pub(super) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error, logging the raw driver detail at debug level.
pub(super) fn classify(error: diesel::result::Error, operation: &str) -> DieselFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation { constraint },
                DatabaseErrorKind::ForeignKeyViolation => {
                    DieselFailure::ForeignKeyViolation { constraint }
                }
                DatabaseErrorKind::ClosedConnection => {
                    DieselFailure::Connection("database connection error".to_owned())
                }
                _ => DieselFailure::Query("database error".to_owned()),
            }
        }
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => {
            DieselFailure::Query("database query error".to_owned())
        }
        other => {
            debug!(error = %other, %operation, "diesel operation failed");
            DieselFailure::Query("database error".to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_messages_survive() {
        assert_eq!(
            pool_error_message(PoolError::checkout("timed out")),
            "timed out"
        );
    }

    #[rstest]
    #[case(diesel::result::Error::NotFound, "record not found")]
    #[case(diesel::result::Error::RollbackTransaction, "database error")]
    fn non_database_errors_are_query_failures(
        #[case] error: diesel::result::Error,
        #[case] message: &str,
    ) {
        assert_eq!(
            classify(error, "test"),
            DieselFailure::Query(message.to_owned())
        );
    }
}
