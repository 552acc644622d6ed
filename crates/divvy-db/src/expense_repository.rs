use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use divvy_core::error::AppError;
use divvy_core::models::{Expense, NewExpense, Split};
use divvy_core::traits::ExpenseStore;

/// Repository for expenses and their splits in PostgreSQL.
///
/// Splits live in `expense_splits`, ordered by `position`; expenses are
/// listed in `seq` (insertion) order.
#[derive(Clone)]
pub struct ExpenseRepository {
    pool: Pool<Postgres>,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an expense and all of its splits in one transaction.
    pub async fn create(&self, expense: &NewExpense) -> Result<Expense, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            INSERT INTO expenses (description, amount, paid_by)
            VALUES ($1, $2, $3)
            RETURNING id, description, amount, paid_by, created_at
            "#,
        )
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.paid_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        let mut split_between = Vec::with_capacity(expense.split_between.len());
        for (position, split) in expense.split_between.iter().enumerate() {
            let position = split_position(position)?;

            // Names that resolve to a user at write time are linked, even if
            // the user registered after the caller looked the name up.
            let user_id: Option<Uuid> = sqlx::query_scalar(
                r#"
                INSERT INTO expense_splits (expense_id, position, username, share, user_id)
                VALUES ($1, $2, $3, $4, COALESCE($5, (SELECT id FROM users WHERE name = $3)))
                RETURNING user_id
                "#,
            )
            .bind(row.id)
            .bind(position)
            .bind(&split.username)
            .bind(split.share)
            .bind(split.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;

            split_between.push(Split {
                username: split.username.clone(),
                share: split.share,
                user_id,
            });
        }

        tx.commit().await.map_err(db_error)?;

        Ok(row.into_expense(split_between))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Expense>, AppError> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT id, description, amount, paid_by, created_at
            FROM expenses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut splits = self.load_splits(&[row.id]).await?;
        let split_between = splits.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_expense(split_between)))
    }

    /// Expenses paid by the user or naming them in a split, oldest first.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        user_name: &str,
    ) -> Result<Vec<Expense>, AppError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT e.id, e.description, e.amount, e.paid_by, e.created_at
            FROM expenses e
            WHERE e.paid_by = $1
               OR EXISTS (
                    SELECT 1 FROM expense_splits s
                    WHERE s.expense_id = e.id
                      AND (s.user_id = $1 OR (s.user_id IS NULL AND s.username = $2))
               )
            ORDER BY e.seq
            "#,
        )
        .bind(user_id)
        .bind(user_name)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut splits = self.load_splits(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let split_between = splits.remove(&row.id).unwrap_or_default();
                row.into_expense(split_between)
            })
            .collect())
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn load_splits(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Split>>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, SplitRow>(
            r#"
            SELECT expense_id, username, share, user_id
            FROM expense_splits
            WHERE expense_id = ANY($1)
            ORDER BY expense_id, position
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut grouped: HashMap<Uuid, Vec<Split>> = HashMap::new();
        for row in rows {
            grouped.entry(row.expense_id).or_default().push(Split {
                username: row.username,
                share: row.share,
                user_id: row.user_id,
            });
        }
        Ok(grouped)
    }
}

/// Convert a split index to the `INTEGER` position column.
fn split_position(index: usize) -> Result<i32, AppError> {
    i32::try_from(index)
        .map_err(|_| AppError::InvalidInput(format!("Too many splits: index {index} out of range")))
}

fn db_error(err: sqlx::Error) -> AppError {
    AppError::DatabaseError(err.to_string())
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct ExpenseRow {
    id: Uuid,
    description: String,
    amount: f64,
    paid_by: Uuid,
    created_at: DateTime<Utc>,
}

impl ExpenseRow {
    fn into_expense(self, split_between: Vec<Split>) -> Expense {
        Expense {
            id: self.id,
            description: self.description,
            amount: self.amount,
            paid_by: self.paid_by,
            split_between,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SplitRow {
    expense_id: Uuid,
    username: String,
    share: f64,
    user_id: Option<Uuid>,
}

// -- Trait implementation --

#[async_trait]
impl ExpenseStore for ExpenseRepository {
    async fn create(&self, expense: NewExpense) -> Result<Expense, AppError> {
        ExpenseRepository::create(self, &expense).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Expense, AppError> {
        ExpenseRepository::get(self, id)
            .await?
            .ok_or_else(AppError::expense_not_found)
    }

    async fn find_for_user(
        &self,
        user_id: Uuid,
        user_name: &str,
    ) -> Result<Vec<Expense>, AppError> {
        ExpenseRepository::list_for_user(self, user_id, user_name).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        ExpenseRepository::health_check(self).await
    }
}
