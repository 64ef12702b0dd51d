//! Store-level errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row already exists")]
    Duplicate,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        let unique_violation = error
            .as_database_error()
            .is_some_and(|e| e.is_unique_violation());

        if unique_violation {
            StoreError::Duplicate
        } else {
            StoreError::Database(error)
        }
    }
}
