//! Core of the Divvy expense splitter: domain types, validation, credentials,
//! bearer tokens, store traits and the services composing them.

pub mod accounts;
pub mod auth;
pub mod credentials;
pub mod error;
pub mod memory;
pub mod models;
pub mod service;
pub mod token;
pub mod traits;
pub mod validation;

pub use accounts::{AccountService, Session};
pub use auth::TokenVerifier;
pub use error::AppError;
pub use memory::InMemoryStore;
pub use models::{Expense, NewExpense, NewUser, Split, User};
pub use service::{ExpenseService, ExpenseView, SplitView};
pub use token::{Claims, TokenConfig, TokenService};
pub use traits::{ExpenseStore, UserStore};
pub use validation::{ProposedExpense, ProposedSplit, validate_expense};
