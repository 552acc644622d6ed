use std::sync::Arc;

use crate::error::AppError;
use crate::models::User;
use crate::token::{TokenConfig, TokenService};
use crate::traits::UserStore;

/// Authorization scheme expected at the start of the header value.
pub const BEARER_PREFIX: &str = "Bearer";

/// Resolves an `Authorization` header value to a registered user.
#[derive(Clone)]
pub struct TokenVerifier {
    tokens: TokenService,
    users: Arc<dyn UserStore>,
}

impl TokenVerifier {
    pub fn new(config: &TokenConfig, users: Arc<dyn UserStore>) -> Self {
        Self {
            tokens: TokenService::new(config),
            users,
        }
    }

    /// Verify the raw header value and look up the user named by the token.
    pub async fn verify_header(&self, header: Option<&str>) -> Result<User, AppError> {
        let rest = header
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or_else(AppError::missing_token)?;

        let token = rest
            .strip_prefix(' ')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::invalid_token("token must be provided"))?;

        let claims = self.tokens.verify(token)?;

        match self.users.find_user(claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(user_id = %claims.sub, "Token subject does not match any user");
                Err(AppError::unknown_user())
            }
        }
    }
}
