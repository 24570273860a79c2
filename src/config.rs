use std::collections::HashMap;
use thiserror::Error;

pub const DEFAULT_DATABASE_PATH: &str = "expenses.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: String,
    pub auto_initialize: bool,
    pub busy_timeout_ms: u32,
    pub log_filter: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            auto_initialize: true,
            busy_timeout_ms: 5000,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Configuration for a database file at `path`, other settings default.
    pub fn with_database_path(path: impl Into<String>) -> Self {
        Config {
            database_path: path.into(),
            ..Config::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_path = env_map
            .get("EXPENSES_DATABASE_PATH")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());
        if database_path.is_empty() {
            return Err(ConfigError::MissingEnv(
                "EXPENSES_DATABASE_PATH".to_string(),
            ));
        }

        let auto_initialize = match env_map
            .get("EXPENSES_AUTO_INIT")
            .map(|s| s.as_str())
            .unwrap_or("true")
        {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "EXPENSES_AUTO_INIT".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let busy_timeout_ms = env_map
            .get("EXPENSES_BUSY_TIMEOUT_MS")
            .map(|s| s.as_str())
            .unwrap_or("5000")
            .parse::<u32>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "EXPENSES_BUSY_TIMEOUT_MS".to_string(),
                    "must be a valid u32".to_string(),
                )
            })?;

        let log_filter = env_map
            .get("EXPENSES_LOG")
            .cloned()
            .unwrap_or_else(|| "info".to_string());

        Ok(Config {
            database_path,
            auto_initialize,
            busy_timeout_ms,
            log_filter,
        })
    }

    /// True when the store should live in memory only.
    pub fn is_in_memory(&self) -> bool {
        self.database_path == ":memory:"
    }
}
