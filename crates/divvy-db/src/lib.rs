pub mod config;
pub mod database;
pub mod expense_repository;
pub mod user_repository;

pub use config::DatabaseConfig;
pub use database::Database;
pub use expense_repository::ExpenseRepository;
pub use user_repository::UserRepository;

use divvy_core::AppError;

/// SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error, turning unique violations into `Conflict`.
pub(crate) fn map_db_error(err: sqlx::Error, conflict: impl FnOnce() -> String) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            AppError::Conflict(conflict())
        }
        _ => AppError::DatabaseError(err.to_string()),
    }
}
