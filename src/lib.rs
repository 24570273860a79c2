pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod notify;
pub mod store;
pub mod telemetry;
pub mod views;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{Decimal, Expense, ExpenseId, NewExpense};
pub use error::StoreError;
pub use notify::{Subscription, UpdateNotifier};
pub use store::ExpenseStore;
pub use views::{ExpenseDraft, ExpenseListView, StatsView};
