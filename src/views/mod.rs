//! View-models for the presentation layer.
//!
//! These hold what a screen displays and know when it has gone stale; the
//! host renders them. Nothing here touches SQL directly.

pub mod form;
pub mod list;
pub mod series;
pub mod stats;

pub use form::{DraftError, ExpenseDraft, SUGGESTED_CATEGORIES};
pub use list::ExpenseListView;
pub use series::{monthly_by_category, CategorySeries, MonthlySeries};
pub use stats::{StatsSnapshot, StatsView};

use crate::notify::{Subscription, UpdateNotifier};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// "Needs reload" bit shared with a notifier handler.
#[derive(Debug, Clone)]
pub(crate) struct StaleFlag(Arc<AtomicBool>);

impl StaleFlag {
    /// A new flag starts set: nothing has been loaded yet.
    pub(crate) fn new() -> Self {
        StaleFlag(Arc::new(AtomicBool::new(true)))
    }

    /// Set the flag on every publish from `notifier`.
    pub(crate) fn watch(&self, notifier: &UpdateNotifier) -> Subscription {
        let flag = Arc::clone(&self.0);
        notifier.subscribe(move || flag.store(true, Ordering::SeqCst))
    }

    pub(crate) fn mark(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
