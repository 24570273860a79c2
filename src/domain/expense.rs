//! Expense entity and its identifier.

use super::decimal::Decimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned expense identifier (SQLite rowid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub i64);

impl ExpenseId {
    /// Create an ExpenseId from a raw rowid.
    pub fn new(id: i64) -> Self {
        ExpenseId(id)
    }

    /// Get the underlying rowid.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded spending event.
///
/// `id` is `None` until the row has been persisted. `date` is kept as the
/// ISO-8601 text that was stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ExpenseId>,
    pub name: String,
    pub amount: Decimal,
    pub category: String,
    pub date: String,
}

impl Expense {
    /// Month bucket (`YYYY-MM`) of this expense's date, taken in UTC.
    ///
    /// Dates carrying an offset are converted first. An expense entered just
    /// after midnight on the 1st east of UTC lands in the previous month, and
    /// one entered late on the last day west of UTC lands in the next. Returns
    /// `None` when the stored date is not ISO-8601.
    pub fn month_key(&self) -> Option<String> {
        parse_iso_date(&self.date).map(|dt| dt.format("%Y-%m").to_string())
    }
}

/// Insert payload: an expense that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    pub name: String,
    pub amount: Decimal,
    pub category: String,
    pub date: String,
}

impl NewExpense {
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        NewExpense {
            name: name.into(),
            amount,
            category: category.into(),
            date: date.into(),
        }
    }

    /// The persisted form of this payload under the given id.
    pub fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id: Some(id),
            name: self.name,
            amount: self.amount,
            category: self.category,
            date: self.date,
        }
    }
}

/// Parse an ISO-8601 date or date-time into UTC.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as
/// midnight UTC).
pub fn parse_iso_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
