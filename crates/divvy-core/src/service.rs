use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Expense, NewExpense, Split, User};
use crate::traits::{ExpenseStore, UserStore};
use crate::validation::{ProposedExpense, validate_expense};

/// Display name used when an expense's payer no longer exists.
pub const UNKNOWN_PAYER: &str = "Unknown";

/// An expense with user ids resolved to display names.
#[derive(Debug, Clone, Serialize)]
pub struct ExpenseView {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub paid_by: String,
    pub split_between: Vec<SplitView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitView {
    pub username: String,
    pub share: f64,
}

/// Creates and reads expenses on behalf of an authenticated user.
#[derive(Clone)]
pub struct ExpenseService {
    users: Arc<dyn UserStore>,
    expenses: Arc<dyn ExpenseStore>,
    restrict_reads: bool,
}

impl ExpenseService {
    pub fn new(users: Arc<dyn UserStore>, expenses: Arc<dyn ExpenseStore>) -> Self {
        Self {
            users,
            expenses,
            restrict_reads: false,
        }
    }

    /// Only let the payer and participants read an expense by id.
    pub fn with_restricted_reads(mut self, restrict: bool) -> Self {
        self.restrict_reads = restrict;
        self
    }

    /// Validate and store a new expense paid by `payer`.
    ///
    /// Participant names that belong to a registered user are linked to that
    /// user's id; other names are kept as guests.
    pub async fn create(
        &self,
        payer: &User,
        proposal: ProposedExpense,
    ) -> Result<ExpenseView, AppError> {
        let validated = validate_expense(proposal)?;

        let mut split_between = Vec::with_capacity(validated.splits.len());
        for split in validated.splits {
            let user_id = self
                .users
                .find_user_by_name(&split.username)
                .await?
                .map(|u| u.id);
            split_between.push(Split {
                username: split.username,
                share: split.share,
                user_id,
            });
        }

        let expense = self
            .expenses
            .create(NewExpense {
                description: validated.description,
                amount: validated.amount,
                paid_by: payer.id,
                split_between,
            })
            .await?;

        tracing::info!(
            expense_id = %expense.id,
            payer = %payer.id,
            amount = expense.amount,
            splits = expense.split_between.len(),
            "Expense created"
        );

        let mut names = NameCache::new(self.users.as_ref());
        names.seed(payer);
        names.render(expense).await
    }

    /// All expenses the user paid or is split into.
    pub async fn list_for(&self, user: &User) -> Result<Vec<ExpenseView>, AppError> {
        let expenses = self.expenses.find_for_user(user.id, &user.name).await?;
        tracing::debug!(user_id = %user.id, count = expenses.len(), "Listed expenses");

        let mut names = NameCache::new(self.users.as_ref());
        names.seed(user);
        let mut views = Vec::with_capacity(expenses.len());
        for expense in expenses {
            views.push(names.render(expense).await?);
        }
        Ok(views)
    }

    pub async fn get(&self, user: &User, id: Uuid) -> Result<ExpenseView, AppError> {
        let expense = self.expenses.find_by_id(id).await?;

        if self.restrict_reads && !expense.involves(user.id, &user.name) {
            tracing::debug!(user_id = %user.id, expense_id = %id, "Read denied to non-participant");
            return Err(AppError::expense_not_found());
        }

        let mut names = NameCache::new(self.users.as_ref());
        names.seed(user);
        names.render(expense).await
    }
}

/// Per-request memo of user id → current display name.
struct NameCache<'a> {
    users: &'a dyn UserStore,
    names: HashMap<Uuid, Option<String>>,
}

impl<'a> NameCache<'a> {
    fn new(users: &'a dyn UserStore) -> Self {
        Self {
            users,
            names: HashMap::new(),
        }
    }

    fn seed(&mut self, user: &User) {
        self.names.insert(user.id, Some(user.name.clone()));
    }

    async fn name_of(&mut self, id: Uuid) -> Result<Option<String>, AppError> {
        if let Some(name) = self.names.get(&id) {
            return Ok(name.clone());
        }
        let name = self.users.find_user(id).await?.map(|u| u.name);
        self.names.insert(id, name.clone());
        Ok(name)
    }

    async fn render(&mut self, expense: Expense) -> Result<ExpenseView, AppError> {
        let paid_by = self
            .name_of(expense.paid_by)
            .await?
            .unwrap_or_else(|| UNKNOWN_PAYER.to_string());

        let mut split_between = Vec::with_capacity(expense.split_between.len());
        for split in expense.split_between {
            let username = match split.user_id {
                Some(id) => self.name_of(id).await?.unwrap_or(split.username),
                None => split.username,
            };
            split_between.push(SplitView {
                username,
                share: split.share,
            });
        }

        Ok(ExpenseView {
            id: expense.id,
            description: expense.description,
            amount: expense.amount,
            paid_by,
            split_between,
            created_at: expense.created_at,
        })
    }
}
