/// Database configuration and connection management
pub mod database;

/// Billing plan catalog loading from config.toml
pub mod catalog;
