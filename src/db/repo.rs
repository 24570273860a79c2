//! SQL statements over the `expenses` table.

use crate::domain::{Decimal, Expense, ExpenseId, NewExpense};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::collections::BTreeMap;
use tracing::warn;

/// Repository for expense rows. Each method is a single statement.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Insert one expense and return its assigned id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_expense(&self, expense: &NewExpense) -> Result<ExpenseId, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO expenses (name, amount, category, date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(expense.name.as_str())
        .bind(expense.amount.to_f64())
        .bind(expense.category.as_str())
        .bind(expense.date.as_str())
        .execute(&self.pool)
        .await?;

        Ok(ExpenseId::new(result.last_insert_rowid()))
    }

    /// All expenses, most recent date first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, amount, category, date
            FROM expenses
            ORDER BY date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(expense_from_row).collect())
    }

    /// Summed amount per distinct category string.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn totals_by_category(&self) -> Result<BTreeMap<String, Decimal>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT category, SUM(amount) AS total
            FROM expenses
            GROUP BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let category: String = row.get("category");
                let total = amount_or_zero(row.get("total"), &category);
                (category, total)
            })
            .collect())
    }

    /// Sum of every amount; zero for an empty table.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn total_amount(&self) -> Result<Decimal, sqlx::Error> {
        let row = sqlx::query("SELECT SUM(amount) AS total FROM expenses")
            .fetch_one(&self.pool)
            .await?;

        let total: Option<f64> = row.get("total");
        Ok(total.map_or_else(Decimal::zero, |t| amount_or_zero(t, "total")))
    }

    /// Delete by id. Returns the number of rows removed (0 or 1).
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn expense_from_row(row: &SqliteRow) -> Expense {
    let id: i64 = row.get("id");
    let amount: f64 = row.get("amount");
    Expense {
        id: Some(ExpenseId::new(id)),
        name: row.get("name"),
        amount: amount_or_zero(amount, &id.to_string()),
        category: row.get("category"),
        date: row.get("date"),
    }
}

fn amount_or_zero(value: f64, context: &str) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        warn!(
            context = %context,
            amount = value,
            "Non-finite amount in expenses table, using zero"
        );
        Decimal::zero()
    })
}
