//! Database opening and schema setup.

use crate::config::Config;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::{info, warn};

/// Open the SQLite database described by `config` and ensure the schema.
///
/// The pool holds a single connection that is never reaped, so an in-memory
/// database keeps its contents for the life of the pool.
pub async fn init_db(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let url = if config.is_in_memory() {
        "sqlite::memory:".to_string()
    } else {
        if let Some(parent) = Path::new(&config.database_path).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!(path = %parent.display(), error = %e, "Could not create database directory");
                }
            }
        }
        format!("sqlite:{}?mode=rwc", config.database_path)
    };

    let busy_timeout_ms = config.busy_timeout_ms;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .after_connect(move |conn, _meta| {
            Box::pin(async move { configure_pragmas_conn(conn, busy_timeout_ms).await })
        })
        .connect(&url)
        .await?;

    run_migrations(&pool).await?;

    info!(path = %config.database_path, "Expense database initialized");
    Ok(pool)
}

/// Apply `schema.sql` statement by statement.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema_sql = include_str!("schema.sql");

    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    Ok(())
}

async fn configure_pragmas_conn(
    conn: &mut SqliteConnection,
    busy_timeout_ms: u32,
) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    // journal_mode returns the mode actually in effect
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);

    sqlx::query(&format!("PRAGMA busy_timeout = {}", busy_timeout_ms))
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&mut *conn)
        .await?;

    info!(journal_mode = %journal_mode, busy_timeout_ms, "SQLite pragmas configured");
    Ok(())
}
