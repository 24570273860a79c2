//! Add-expense form input and its validation.
//!
//! The store persists whatever it is given; this is where user input is
//! checked before it gets there.

use crate::domain::{parse_iso_date, Decimal, NewExpense};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entries offered by the category picker. Free text is still accepted.
pub const SUGGESTED_CATEGORIES: &[&str] = &[
    "Nourriture",
    "Transport",
    "Logement",
    "Loisirs",
    "Santé",
    "Autres",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Amount must be a positive number, got {0:?}")]
    InvalidAmount(String),
    #[error("Date must be ISO-8601, got {0:?}")]
    InvalidDate(String),
}

/// Raw form fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub name: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl ExpenseDraft {
    /// Check every field and produce the insert payload.
    ///
    /// The amount accepts one `,` as the decimal separator and must be > 0. The
    /// date is normalised to RFC 3339 UTC with millisecond precision.
    pub fn validate(&self) -> Result<NewExpense, DraftError> {
        let name = self.name.trim();
        let amount = self.amount.trim();
        let category = self.category.trim();
        let date = self.date.trim();

        for (field, value) in [
            ("name", name),
            ("amount", amount),
            ("category", category),
            ("date", date),
        ] {
            if value.is_empty() {
                return Err(DraftError::MissingField(field));
            }
        }

        let parsed = Decimal::from_str_canonical(&amount.replacen(',', ".", 1))
            .map_err(|_| DraftError::InvalidAmount(self.amount.clone()))?;
        if !parsed.is_positive() {
            return Err(DraftError::InvalidAmount(self.amount.clone()));
        }

        let when =
            parse_iso_date(date).ok_or_else(|| DraftError::InvalidDate(self.date.clone()))?;

        Ok(NewExpense::new(
            name,
            parsed,
            category,
            when.to_rfc3339_opts(SecondsFormat::Millis, true),
        ))
    }
}
