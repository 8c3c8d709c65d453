/// Administrator credentials from environment variables
pub mod admin;

/// Catalog seed loading from catalog.toml
pub mod catalog;

/// Database configuration and connection management
pub mod database;
