//! Statistics view-model: grand total, per-category totals and the
//! monthly series, loaded together.

use super::series::{monthly_by_category, MonthlySeries};
use super::StaleFlag;
use crate::domain::Decimal;
use crate::error::StoreError;
use crate::notify::Subscription;
use crate::store::ExpenseStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total: Decimal,
    pub by_category: BTreeMap<String, Decimal>,
    pub monthly: MonthlySeries,
}

pub struct StatsView {
    store: Arc<ExpenseStore>,
    snapshot: StatsSnapshot,
    stale: StaleFlag,
    _subscription: Subscription,
}

impl StatsView {
    pub fn new(store: Arc<ExpenseStore>) -> Self {
        let stale = StaleFlag::new();
        let subscription = stale.watch(store.notifier());
        StatsView {
            store,
            snapshot: StatsSnapshot::default(),
            stale,
            _subscription: subscription,
        }
    }

    /// Reload all statistics. On failure the previous snapshot is kept.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        self.stale.clear();
        let loaded = tokio::try_join!(
            self.store.get_total_expenses(),
            self.store.get_expenses_by_category(),
            self.store.get_expenses(),
        );

        match loaded {
            Ok((total, by_category, expenses)) => {
                self.snapshot = StatsSnapshot {
                    total,
                    by_category,
                    monthly: monthly_by_category(&expenses),
                };
                Ok(())
            }
            Err(e) => {
                self.stale.mark();
                warn!(error = %e, "Failed to load statistics, keeping previous snapshot");
                Err(e)
            }
        }
    }

    pub async fn refresh_if_stale(&mut self) -> Result<bool, StoreError> {
        if !self.stale.is_set() {
            return Ok(false);
        }
        self.load().await.map(|_| true)
    }

    pub fn is_stale(&self) -> bool {
        self.stale.is_set()
    }

    pub fn snapshot(&self) -> &StatsSnapshot {
        &self.snapshot
    }
}
