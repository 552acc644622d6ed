use std::sync::Arc;

use divvy_core::{
    AccountService, ExpenseService, ExpenseStore, InMemoryStore, TokenConfig, TokenVerifier,
    UserStore,
};
use divvy_db::Database;

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub accounts: AccountService,
    pub expenses: ExpenseService,
    pub verifier: TokenVerifier,
    /// Checked by `/health`.
    pub store: Arc<dyn ExpenseStore>,
    /// Name of the storage backend, reported by `/health`.
    pub storage: &'static str,
}

impl AppState {
    pub fn new(
        token: &TokenConfig,
        restrict_reads: bool,
        users: Arc<dyn UserStore>,
        expenses: Arc<dyn ExpenseStore>,
        storage: &'static str,
    ) -> Self {
        Self {
            accounts: AccountService::new(token, users.clone()),
            expenses: ExpenseService::new(users.clone(), expenses.clone())
                .with_restricted_reads(restrict_reads),
            verifier: TokenVerifier::new(token, users),
            store: expenses,
            storage,
        }
    }

    /// State backed by PostgreSQL.
    pub fn with_database(token: &TokenConfig, restrict_reads: bool, db: &Database) -> Self {
        Self::new(
            token,
            restrict_reads,
            Arc::new(db.user_repo()),
            Arc::new(db.expense_repo()),
            "postgres",
        )
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(token: &TokenConfig, restrict_reads: bool) -> Self {
        let store = InMemoryStore::new();
        Self::new(
            token,
            restrict_reads,
            Arc::new(store.clone()),
            Arc::new(store),
            "memory",
        )
    }
}
