/// Database configuration and connection management
pub mod database;

/// Application settings loaded from config.toml
pub mod settings;

/// Reviewer roster from environment variables
pub mod users;
