use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid database connection configuration: {0}")]
    ConnectionConfigError(String),

    #[error("A database operation failed: {0}")]
    Sqlx(sqlx::Error),

    /// A constraint rejected the write, e.g. a second diet plan for the same
    /// external user id.
    #[error("A database constraint was violated: {0}")]
    Integrity(String),

    #[error("The requested data was not found in the database.")]
    NotFound,
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err)
                if matches!(
                    db_err.kind(),
                    ErrorKind::UniqueViolation
                        | ErrorKind::ForeignKeyViolation
                        | ErrorKind::NotNullViolation
                        | ErrorKind::CheckViolation
                ) =>
            {
                DbError::Integrity(db_err.to_string())
            }
            other => DbError::Sqlx(other),
        }
    }
}
