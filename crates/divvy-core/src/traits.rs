use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Expense, NewExpense, NewUser, User};

/// Persists and looks up users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Conflict` if the name is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, AppError>;

    /// Change a user's display name. The id, and therefore every expense
    /// linked to it, is unaffected.
    async fn rename_user(&self, id: Uuid, name: &str) -> Result<User, AppError>;
}

/// Persists and retrieves expenses.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Save a new expense. Returns the stored record with its generated id
    /// and creation timestamp.
    async fn create(&self, expense: NewExpense) -> Result<Expense, AppError>;

    /// Fails with `NotFound` if no expense has this id.
    async fn find_by_id(&self, id: Uuid) -> Result<Expense, AppError>;

    /// Every expense the user paid or takes part in, each exactly once,
    /// in insertion order.
    async fn find_for_user(&self, user_id: Uuid, user_name: &str)
    -> Result<Vec<Expense>, AppError>;

    /// Check that the backing storage is reachable.
    async fn health_check(&self) -> Result<(), AppError>;
}
