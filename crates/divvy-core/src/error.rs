use thiserror::Error;

/// Application-wide error types for Divvy.
#[derive(Error, Debug)]
pub enum AppError {
    /// The request carried no usable credential, or it did not resolve to a user.
    #[error("{message}")]
    Unauthenticated {
        message: &'static str,
        detail: Option<String>,
    },

    /// Login attempted with an unknown name or a wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A required field is missing or malformed.
    #[error("{0}")]
    InvalidInput(String),

    /// Every proposed split was filtered out.
    #[error("Please provide at least one valid user to split with")]
    NoValidSplits,

    /// Split shares do not add up to the expense amount.
    #[error("Total shares must equal the expense amount")]
    ShareMismatch { amount: f64, total: f64 },

    #[error("{0}")]
    NotFound(String),

    /// Unique constraint violated (e.g. user name already taken).
    #[error("{0}")]
    Conflict(String),

    /// Signing a token failed.
    #[error("Token error: {0}")]
    TokenError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn missing_token() -> Self {
        AppError::Unauthenticated {
            message: "Not authorized, no token provided",
            detail: None,
        }
    }

    pub fn invalid_token(detail: impl Into<String>) -> Self {
        AppError::Unauthenticated {
            message: "Not authorized",
            detail: Some(detail.into()),
        }
    }

    pub fn unknown_user() -> Self {
        AppError::Unauthenticated {
            message: "Not authorized, user not found",
            detail: None,
        }
    }

    pub fn expense_not_found() -> Self {
        AppError::NotFound("Expense not found".to_string())
    }

    /// Extra context shown next to the message in error bodies, if any.
    pub fn detail(&self) -> Option<String> {
        match self {
            AppError::Unauthenticated { detail, .. } => detail.clone(),
            AppError::ShareMismatch { amount, total } => Some(format!(
                "shares sum to {total:.2}, expense amount is {amount:.2}"
            )),
            _ => None,
        }
    }

    /// Returns true for errors caused by the caller rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Unauthenticated { .. }
                | AppError::InvalidCredentials
                | AppError::InvalidInput(_)
                | AppError::NoValidSplits
                | AppError::ShareMismatch { .. }
                | AppError::NotFound(_)
                | AppError::Conflict(_)
        )
    }
}
