use std::sync::Arc;

use crate::credentials::{MIN_PASSWORD_LEN, dummy_hash, hash_password, verify_password};
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::token::{TokenConfig, TokenService};
use crate::traits::UserStore;

/// Longest accepted display name, in characters.
pub const MAX_NAME_LEN: usize = 64;

/// A user together with a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Registration, login and profile changes.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(config: &TokenConfig, users: Arc<dyn UserStore>) -> Self {
        Self {
            users,
            tokens: TokenService::new(config),
        }
    }

    pub async fn register(&self, name: &str, password: &str) -> Result<Session, AppError> {
        let name = normalize_name(name)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = self
            .users
            .create_user(NewUser {
                name,
                password_hash: hash_password(password)?,
            })
            .await?;
        tracing::info!(user_id = %user.id, "User registered");

        let token = self.tokens.issue(&user)?;
        Ok(Session { user, token })
    }

    /// Unknown names and wrong passwords fail the same way.
    pub async fn login(&self, name: &str, password: &str) -> Result<Session, AppError> {
        let user = self.users.find_user_by_name(name.trim()).await?;

        // Unknown names still pay for one hash check.
        let verified = match &user {
            Some(user) => verify_password(password, &user.password_hash),
            None => verify_password(password, dummy_hash()),
        };

        let user = user
            .filter(|_| verified)
            .ok_or(AppError::InvalidCredentials)?;

        let token = self.tokens.issue(&user)?;
        Ok(Session { user, token })
    }

    pub async fn rename(&self, user: &User, name: &str) -> Result<User, AppError> {
        let name = normalize_name(name)?;
        let renamed = self.users.rename_user(user.id, &name).await?;
        tracing::info!(user_id = %user.id, "User renamed");
        Ok(renamed)
    }

    /// Issue a token for an existing user (admin tooling).
    pub fn issue_token(&self, user: &User) -> Result<String, AppError> {
        self.tokens.issue(user)
    }
}

fn normalize_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}
