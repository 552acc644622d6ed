//! Expense validation: required fields, split filtering and the
//! share-sum-equals-amount check.

use crate::error::AppError;

/// Maximum allowed difference between the sum of shares and the amount.
pub const SHARE_TOLERANCE: f64 = 0.01;

/// An expense as submitted by a client, before any checks.
#[derive(Debug, Clone, Default)]
pub struct ProposedExpense {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub split_between: Option<Vec<ProposedSplit>>,
}

/// A split as submitted. `share` is `None` when the client sent something
/// other than a number.
#[derive(Debug, Clone, Default)]
pub struct ProposedSplit {
    pub username: Option<String>,
    pub share: Option<f64>,
}

impl ProposedSplit {
    pub fn new(username: impl Into<String>, share: f64) -> Self {
        Self {
            username: Some(username.into()),
            share: Some(share),
        }
    }

    fn into_valid(self) -> Option<ValidSplit> {
        let username = self.username.filter(|name| !name.trim().is_empty())?;
        let share = self.share.filter(|share| share.is_finite() && *share > 0.0)?;
        Some(ValidSplit { username, share })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidSplit {
    pub username: String,
    pub share: f64,
}

/// Output of [`validate_expense`]: every field present, every split valid,
/// shares summing to the amount.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedExpense {
    pub description: String,
    pub amount: f64,
    pub splits: Vec<ValidSplit>,
}

/// Validate a proposed expense.
///
/// Splits with a blank participant name or a non-positive share are dropped
/// before the sum is checked.
pub fn validate_expense(proposal: ProposedExpense) -> Result<ValidatedExpense, AppError> {
    let (Some(description), Some(amount), Some(split_between)) = (
        proposal.description.filter(|d| !d.trim().is_empty()),
        proposal.amount.filter(|a| a.is_finite() && *a > 0.0),
        proposal.split_between,
    ) else {
        return Err(AppError::InvalidInput(
            "Please provide all required fields".to_string(),
        ));
    };

    let splits: Vec<ValidSplit> = split_between
        .into_iter()
        .filter_map(ProposedSplit::into_valid)
        .collect();

    if splits.is_empty() {
        return Err(AppError::NoValidSplits);
    }

    let total: f64 = splits.iter().map(|s| s.share).sum();
    if (total - amount).abs() > SHARE_TOLERANCE {
        return Err(AppError::ShareMismatch { amount, total });
    }

    Ok(ValidatedExpense {
        description,
        amount,
        splits,
    })
}
