//! The expense store: sole gateway to persisted expenses.
//!
//! Owns the database pool (opened once, lazily or via [`ExpenseStore::initialize`])
//! and the [`UpdateNotifier`] that is signalled after every successful
//! mutation. Construct it once and share it by `Arc`.

use crate::config::Config;
use crate::db::{init_db, Repository};
use crate::domain::{Decimal, Expense, ExpenseId, NewExpense};
use crate::error::StoreError;
use crate::notify::UpdateNotifier;
use std::collections::BTreeMap;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub struct ExpenseStore {
    config: Config,
    repo: OnceCell<Repository>,
    notifier: UpdateNotifier,
}

impl ExpenseStore {
    /// Create an unopened store with its own notifier.
    pub fn new(config: Config) -> Self {
        Self::with_notifier(config, UpdateNotifier::new())
    }

    /// Create an unopened store that publishes to `notifier`.
    pub fn with_notifier(config: Config, notifier: UpdateNotifier) -> Self {
        ExpenseStore {
            config,
            repo: OnceCell::new(),
            notifier,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notifier(&self) -> &UpdateNotifier {
        &self.notifier
    }

    /// Whether the database has been opened and its schema ensured.
    pub fn is_initialized(&self) -> bool {
        self.repo.initialized()
    }

    /// Open the database and ensure the schema. Idempotent.
    ///
    /// A failure leaves the store uninitialized; calling again retries.
    ///
    /// # Errors
    /// Returns `StorageUnavailable` if the database cannot be opened or set up.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.open().await.map(|_| ())
    }

    async fn open(&self) -> Result<&Repository, StoreError> {
        self.repo
            .get_or_try_init(|| async {
                init_db(&self.config)
                    .await
                    .map(Repository::new)
                    .map_err(|e| {
                        error!(
                            path = %self.config.database_path,
                            error = %e,
                            "Failed to open expense database"
                        );
                        StoreError::StorageUnavailable(e.to_string())
                    })
            })
            .await
    }

    async fn repo(&self, operation: &'static str) -> Result<&Repository, StoreError> {
        if let Some(repo) = self.repo.get() {
            return Ok(repo);
        }
        if !self.config.auto_initialize {
            warn!(operation, "Expense store used before initialization");
            return Err(StoreError::NotInitialized);
        }
        self.open().await
    }

    /// Insert one expense and return its new id.
    ///
    /// No field validation happens here; callers filter their input.
    ///
    /// # Errors
    /// Returns `QueryFailed` if the engine rejects the insert.
    pub async fn add_expense(&self, expense: &NewExpense) -> Result<ExpenseId, StoreError> {
        let id = self
            .repo("add_expense")
            .await?
            .insert_expense(expense)
            .await
            .map_err(query_failed("add_expense"))?;

        info!(id = %id, category = %expense.category, "Expense added");
        self.notifier.publish();
        Ok(id)
    }

    /// Every expense, most recent date first.
    ///
    /// # Errors
    /// Returns `QueryFailed` if the query fails.
    pub async fn get_expenses(&self) -> Result<Vec<Expense>, StoreError> {
        let expenses = self
            .repo("get_expenses")
            .await?
            .list_expenses()
            .await
            .map_err(query_failed("get_expenses"))?;

        debug!(count = expenses.len(), "Loaded expenses");
        Ok(expenses)
    }

    /// Summed amount per distinct category string.
    ///
    /// # Errors
    /// Returns `QueryFailed` if the query fails.
    pub async fn get_expenses_by_category(&self) -> Result<BTreeMap<String, Decimal>, StoreError> {
        self.repo("get_expenses_by_category")
            .await?
            .totals_by_category()
            .await
            .map_err(query_failed("get_expenses_by_category"))
    }

    /// Sum of all amounts; zero when there are none.
    ///
    /// # Errors
    /// Returns `QueryFailed` if the query fails.
    pub async fn get_total_expenses(&self) -> Result<Decimal, StoreError> {
        self.repo("get_total_expenses")
            .await?
            .total_amount()
            .await
            .map_err(query_failed("get_total_expenses"))
    }

    /// Delete the expense with `id`. A missing id is not an error.
    ///
    /// # Errors
    /// Returns `QueryFailed` if the engine rejects the delete.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<(), StoreError> {
        let removed = self
            .repo("delete_expense")
            .await?
            .delete_expense(id)
            .await
            .map_err(query_failed("delete_expense"))?;

        info!(id = %id, removed, "Expense deleted");
        self.notifier.publish();
        Ok(())
    }
}

fn query_failed(operation: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        error!(operation, error = %e, "Expense query failed");
        StoreError::from(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn memory_store() -> ExpenseStore {
        ExpenseStore::new(Config::with_database_path(":memory:"))
    }

    fn coffee() -> NewExpense {
        NewExpense::new(
            "Coffee",
            Decimal::from_str_canonical("4.50").unwrap(),
            "Food",
            "2024-01-05",
        )
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let store = memory_store();
        assert!(!store.is_initialized());
        store.initialize().await.unwrap();
        store.add_expense(&coffee()).await.unwrap();
        store.initialize().await.unwrap();

        assert!(store.is_initialized());
        // a second initialize must not reopen and lose the in-memory rows
        assert_eq!(store.get_expenses().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_operations_self_initialize() {
        let store = memory_store();
        assert!(store.get_total_expenses().await.unwrap().is_zero());
        assert!(store.is_initialized());
    }

    #[tokio::test]
    async fn test_not_initialized_without_auto_init() {
        let mut config = Config::with_database_path(":memory:");
        config.auto_initialize = false;
        let store = ExpenseStore::new(config);

        let err = store.get_expenses().await.unwrap_err();
        assert!(matches!(err, StoreError::NotInitialized));
        let err = store.add_expense(&coffee()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotInitialized));

        store.initialize().await.unwrap();
        assert!(store.get_expenses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_publish_once_each() {
        let store = memory_store();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = store.notifier().subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let id = store.add_expense(&coffee()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        store.get_expenses().await.unwrap();
        store.get_total_expenses().await.unwrap();
        store.get_expenses_by_category().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        store.delete_expense(id).await.unwrap();
        store.delete_expense(id).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_operation_does_not_publish() {
        let mut config = Config::with_database_path(":memory:");
        config.auto_initialize = false;
        let store = ExpenseStore::new(config);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let _sub = store.notifier().subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(store.add_expense(&coffee()).await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_persists_unvalidated_amounts() {
        let store = memory_store();
        let refund = NewExpense::new(
            "Refund",
            Decimal::from_str_canonical("-3").unwrap(),
            "Food",
            "2024-01-08",
        );
        store.add_expense(&refund).await.unwrap();
        assert_eq!(
            store.get_total_expenses().await.unwrap(),
            Decimal::from_str_canonical("-3").unwrap()
        );
    }
}
