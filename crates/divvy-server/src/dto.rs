use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use divvy_core::models::User;
use divvy_core::service::{ExpenseView, SplitView};
use divvy_core::validation::{ProposedExpense, ProposedSplit};

// ---------------------------------------------------------------------------
// Expenses
// ---------------------------------------------------------------------------

/// Fields are kept as raw JSON so that missing or mistyped values surface as
/// a 400 with our own message instead of a deserialization rejection.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateExpenseRequest {
    #[schema(value_type = Option<String>)]
    pub description: Option<serde_json::Value>,
    #[schema(value_type = Option<f64>)]
    pub amount: Option<serde_json::Value>,
    #[serde(rename = "splitBetween")]
    #[schema(value_type = Option<Vec<SplitRequest>>)]
    pub split_between: Option<serde_json::Value>,
}

/// Documented shape of one `splitBetween` entry.
#[derive(Debug, utoipa::ToSchema)]
pub struct SplitRequest {
    pub username: Option<String>,
    /// Non-numeric shares are dropped rather than rejected.
    pub share: Option<f64>,
}

impl From<CreateExpenseRequest> for ProposedExpense {
    fn from(body: CreateExpenseRequest) -> Self {
        Self {
            description: body
                .description
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned),
            amount: body.amount.as_ref().and_then(serde_json::Value::as_f64),
            split_between: body
                .split_between
                .as_ref()
                .and_then(serde_json::Value::as_array)
                .map(|splits| splits.iter().map(proposed_split).collect()),
        }
    }
}

/// Entries that are not objects become splits with neither field set.
fn proposed_split(value: &serde_json::Value) -> ProposedSplit {
    ProposedSplit {
        username: value
            .get("username")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
        share: value.get("share").and_then(serde_json::Value::as_f64),
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ExpenseResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    /// Display name of the payer.
    #[serde(rename = "paidBy")]
    pub paid_by: String,
    #[serde(rename = "splitBetween")]
    pub split_between: Vec<SplitResponse>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SplitResponse {
    pub username: String,
    pub share: f64,
}

impl From<SplitView> for SplitResponse {
    fn from(split: SplitView) -> Self {
        Self {
            username: split.username,
            share: split.share,
        }
    }
}

impl From<ExpenseView> for ExpenseResponse {
    fn from(view: ExpenseView) -> Self {
        Self {
            id: view.id,
            description: view.description,
            amount: view.amount,
            paid_by: view.paid_by,
            split_between: view.split_between.into_iter().map(Into::into).collect(),
            created_at: view.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub id: Uuid,
    pub name: String,
    pub token: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RenameRequest {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
