mod common;
mod expense_tests;
mod user_tests;
