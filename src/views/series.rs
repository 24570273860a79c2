//! Month-by-month spending per category, shaped for a line chart.

use crate::domain::{Decimal, Expense};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// One category's totals, aligned index-for-index with [`MonthlySeries::months`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySeries {
    pub category: String,
    pub totals: Vec<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySeries {
    /// `YYYY-MM` keys, ascending.
    pub months: Vec<String>,
    /// Categories in the order they first appear in the input.
    pub series: Vec<CategorySeries>,
}

impl MonthlySeries {
    /// Chart axis labels, `MM/YYYY`.
    pub fn labels(&self) -> Vec<String> {
        self.months.iter().map(|m| month_label(m)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// Group expenses by category, then by UTC month.
///
/// Months with no spending in a category are filled with zero. Expenses
/// whose date does not parse are left out.
pub fn monthly_by_category(expenses: &[Expense]) -> MonthlySeries {
    let mut order: Vec<String> = Vec::new();
    let mut per_category: BTreeMap<String, BTreeMap<String, Decimal>> = BTreeMap::new();
    let mut months: BTreeSet<String> = BTreeSet::new();

    for expense in expenses {
        let Some(month) = expense.month_key() else {
            warn!(
                id = ?expense.id,
                date = %expense.date,
                "Skipping expense with unparseable date"
            );
            continue;
        };

        if !per_category.contains_key(&expense.category) {
            order.push(expense.category.clone());
        }
        *per_category
            .entry(expense.category.clone())
            .or_default()
            .entry(month.clone())
            .or_default() += expense.amount;
        months.insert(month);
    }

    let months: Vec<String> = months.into_iter().collect();
    let series = order
        .into_iter()
        .map(|category| {
            let by_month = per_category.remove(&category).unwrap_or_default();
            let totals = months
                .iter()
                .map(|m| by_month.get(m).copied().unwrap_or_default())
                .collect();
            CategorySeries { category, totals }
        })
        .collect();

    MonthlySeries { months, series }
}

fn month_label(month: &str) -> String {
    match month.split_once('-') {
        Some((year, mm)) => format!("{}/{}", mm, year),
        None => month.to_string(),
    }
}
