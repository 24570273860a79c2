//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database opening, pragma configuration and schema setup
//! - Repository layer issuing the expense statements

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
