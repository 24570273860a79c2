//! Expense list view-model: last loaded rows plus a category filter.

use super::StaleFlag;
use crate::domain::{Decimal, Expense, ExpenseId};
use crate::error::StoreError;
use crate::notify::Subscription;
use crate::store::ExpenseStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

pub struct ExpenseListView {
    store: Arc<ExpenseStore>,
    expenses: Vec<Expense>,
    category_filter: Option<String>,
    stale: StaleFlag,
    _subscription: Subscription,
}

impl ExpenseListView {
    /// Create an empty view that marks itself stale on every store update.
    pub fn new(store: Arc<ExpenseStore>) -> Self {
        let stale = StaleFlag::new();
        let subscription = stale.watch(store.notifier());
        ExpenseListView {
            store,
            expenses: Vec::new(),
            category_filter: None,
            stale,
            _subscription: subscription,
        }
    }

    /// Reload every expense from the store.
    ///
    /// On failure the previously loaded rows are kept.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        self.stale.clear();
        match self.store.get_expenses().await {
            Ok(expenses) => {
                self.expenses = expenses;
                Ok(())
            }
            Err(e) => {
                self.stale.mark();
                warn!(error = %e, "Failed to load expenses, keeping previous list");
                Err(e)
            }
        }
    }

    /// Reload only if the store changed since the last load.
    ///
    /// Returns whether a reload happened.
    pub async fn refresh_if_stale(&mut self) -> Result<bool, StoreError> {
        if !self.stale.is_set() {
            return Ok(false);
        }
        self.load().await.map(|_| true)
    }

    pub fn is_stale(&self) -> bool {
        self.stale.is_set()
    }

    /// Delete an expense, then reload.
    pub async fn delete(&mut self, id: ExpenseId) -> Result<(), StoreError> {
        self.store.delete_expense(id).await?;
        self.load().await
    }

    /// Show only expenses whose category equals `category` exactly.
    pub fn set_category_filter(&mut self, category: Option<String>) {
        self.category_filter = category;
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category_filter.as_deref()
    }

    /// Every loaded expense, most recent first.
    pub fn all(&self) -> &[Expense] {
        &self.expenses
    }

    /// Loaded expenses passing the category filter, in list order.
    pub fn visible(&self) -> Vec<&Expense> {
        self.expenses
            .iter()
            .filter(|e| match &self.category_filter {
                Some(category) => &e.category == category,
                None => true,
            })
            .collect()
    }

    pub fn visible_total(&self) -> Decimal {
        self.visible().into_iter().map(|e| e.amount).sum()
    }

    /// Distinct categories among the loaded expenses, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.expenses
            .iter()
            .map(|e| e.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
