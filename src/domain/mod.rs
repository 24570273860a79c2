//! Domain types for the expense tracker.
//!
//! - Lossless amounts via the Decimal wrapper
//! - The Expense entity, its id and the insert payload

pub mod decimal;
pub mod expense;

pub use decimal::Decimal;
pub use expense::{parse_iso_date, Expense, ExpenseId, NewExpense};
