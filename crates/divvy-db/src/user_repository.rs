use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, Transaction};
use uuid::Uuid;

use divvy_core::error::AppError;
use divvy_core::models::{NewUser, User};
use divvy_core::traits::UserStore;

use crate::map_db_error;

/// Repository for users in PostgreSQL.
#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user and claim guest splits entered under its name.
    pub async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, password_hash)
            VALUES ($1, $2)
            RETURNING id, name, password_hash, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, || format!("User already exists: {}", user.name)))?;

        claim_guest_splits(&mut tx, row.id, &row.name).await?;
        tx.commit().await.map_err(db_error)?;

        Ok(row.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, password_hash, created_at, updated_at
            FROM users
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    /// Rename a user; guest splits entered under the new name become theirs.
    pub async fn rename(&self, id: Uuid, name: &str) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, password_hash, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, || format!("User already exists: {name}")))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        claim_guest_splits(&mut tx, row.id, &row.name).await?;
        tx.commit().await.map_err(db_error)?;

        Ok(row.into())
    }
}

async fn claim_guest_splits(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    name: &str,
) -> Result<(), AppError> {
    let claimed = sqlx::query(
        r#"
        UPDATE expense_splits
        SET user_id = $1
        WHERE user_id IS NULL AND username = $2
        "#,
    )
    .bind(user_id)
    .bind(name)
    .execute(&mut **tx)
    .await
    .map_err(db_error)?
    .rows_affected();

    if claimed > 0 {
        tracing::info!(user_id = %user_id, claimed, "Linked guest splits to user");
    }
    Ok(())
}

fn db_error(err: sqlx::Error) -> AppError {
    AppError::DatabaseError(err.to_string())
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// -- Trait implementation --

#[async_trait]
impl UserStore for UserRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        UserRepository::create(self, &user).await
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        UserRepository::get(self, id).await
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, AppError> {
        UserRepository::get_by_name(self, name).await
    }

    async fn rename_user(&self, id: Uuid, name: &str) -> Result<User, AppError> {
        UserRepository::rename(self, id, name).await
    }
}
