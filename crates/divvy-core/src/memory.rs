//! In-memory storage backend.
//!
//! Used by the server when no database is configured, and by tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Expense, NewExpense, NewUser, User};
use crate::traits::{ExpenseStore, UserStore};

/// Users keyed by id, expenses in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    expenses: Arc<RwLock<Vec<Expense>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link guest splits entered under `name` to the user now holding it.
    ///
    /// Callers hold the users write lock; the lock order is users, then expenses.
    async fn claim_guest_splits(&self, user_id: Uuid, name: &str) {
        let mut expenses = self.expenses.write().await;
        for split in expenses
            .iter_mut()
            .flat_map(|e| e.split_between.iter_mut())
            .filter(|s| s.user_id.is_none() && s.username == name)
        {
            split.user_id = Some(user_id);
        }
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.name == user.name) {
            return Err(AppError::Conflict(format!(
                "User already exists: {}",
                user.name
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        self.claim_guest_splits(user.id, &user.name).await;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.name == name).cloned())
    }

    async fn rename_user(&self, id: Uuid, name: &str) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.name == name && u.id != id) {
            return Err(AppError::Conflict(format!("User already exists: {name}")));
        }

        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.name = name.to_string();
        user.updated_at = Utc::now();
        let user = user.clone();
        self.claim_guest_splits(user.id, &user.name).await;
        Ok(user)
    }
}

#[async_trait]
impl ExpenseStore for InMemoryStore {
    async fn create(&self, expense: NewExpense) -> Result<Expense, AppError> {
        let users = self.users.read().await;
        let split_between = expense
            .split_between
            .into_iter()
            .map(|mut split| {
                if split.user_id.is_none() {
                    split.user_id = users
                        .values()
                        .find(|u| u.name == split.username)
                        .map(|u| u.id);
                }
                split
            })
            .collect();

        let expense = Expense {
            id: Uuid::new_v4(),
            description: expense.description,
            amount: expense.amount,
            paid_by: expense.paid_by,
            split_between,
            created_at: Utc::now(),
        };
        let mut expenses = self.expenses.write().await;
        expenses.push(expense.clone());
        Ok(expense)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Expense, AppError> {
        let expenses = self.expenses.read().await;
        expenses
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(AppError::expense_not_found)
    }

    async fn find_for_user(
        &self,
        user_id: Uuid,
        user_name: &str,
    ) -> Result<Vec<Expense>, AppError> {
        let expenses = self.expenses.read().await;
        Ok(expenses
            .iter()
            .filter(|e| e.involves(user_id, user_name))
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
