use std::time::Duration;

use divvy_core::AppError;
use divvy_core::TokenConfig;
use divvy_db::DatabaseConfig;

const DEFAULT_PORT: u16 = 5000;

/// Server settings read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub token: TokenConfig,
    /// Limit `GET /api/expenses/{id}` to the payer and participants.
    pub restrict_reads: bool,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `JWT_SECRET` (required)
    /// - `JWT_EXPIRES_IN_SECS` (optional, defaults to 30 days)
    /// - `DIVVY_PORT` or `PORT` (optional, defaults to 5000)
    /// - `DIVVY_RESTRICT_EXPENSE_READS` (optional, defaults to false)
    /// - `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS` (optional)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::ConfigError("JWT_SECRET must be set".into()))?;

        let mut token = TokenConfig::new(secret);
        if let Some(raw) = lookup("JWT_EXPIRES_IN_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid JWT_EXPIRES_IN_SECS '{raw}': must be a positive integer"
                ))
            })?;
            if secs == 0 {
                return Err(AppError::ConfigError(
                    "JWT_EXPIRES_IN_SECS must be at least 1".into(),
                ));
            }
            token = token.with_ttl(Duration::from_secs(secs));
        }

        let port = match lookup("DIVVY_PORT").or_else(|| lookup("PORT")) {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid port '{raw}': must be 0-65535"))
            })?,
        };

        let restrict_reads = match lookup("DIVVY_RESTRICT_EXPENSE_READS") {
            None => false,
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::ConfigError(format!(
                    "Invalid DIVVY_RESTRICT_EXPENSE_READS '{raw}': expected true or false"
                ))
            })?,
        };

        let database = match lookup("DATABASE_URL").filter(|s| !s.is_empty()) {
            None => None,
            Some(url) => Some(DatabaseConfig::with_url(
                url,
                lookup("DATABASE_MAX_CONNECTIONS").as_deref(),
            )?),
        };

        Ok(Self {
            port,
            token,
            restrict_reads,
            database,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
