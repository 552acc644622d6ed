use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// `id` never changes; `name` is the display name and may be renamed.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for inserting a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub password_hash: String,
}

/// One participant's share of an expense.
///
/// `user_id` links the participant to a registered user when the name
/// resolved at creation time; `username` is the name as entered and is only
/// used for display (and for matching guests, whose `user_id` is `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub username: String,
    pub share: f64,
    pub user_id: Option<Uuid>,
}

impl Split {
    /// Whether this split belongs to the given user.
    pub fn involves(&self, user_id: Uuid, user_name: &str) -> bool {
        match self.user_id {
            Some(id) => id == user_id,
            None => self.username == user_name,
        }
    }
}

/// A stored expense. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    /// Id of the user who fronted the amount.
    pub paid_by: Uuid,
    pub split_between: Vec<Split>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Payer or split participant.
    pub fn involves(&self, user_id: Uuid, user_name: &str) -> bool {
        self.paid_by == user_id
            || self
                .split_between
                .iter()
                .any(|split| split.involves(user_id, user_name))
    }

    pub fn total_shares(&self) -> f64 {
        self.split_between.iter().map(|s| s.share).sum()
    }
}

/// DTO for inserting a new expense. Id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub paid_by: Uuid,
    pub split_between: Vec<Split>,
}
