//! Shared test utilities for `BudgetBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{expense, premium::RequestStatus, profile},
    entities,
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a member profile.
///
/// # Defaults
/// * `display_name`: `"Test {user_id}"`
/// * `role`: member
pub async fn create_test_profile(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<entities::profile::Model> {
    profile::ensure_profile(db, user_id, &format!("Test {user_id}"), false).await
}

/// Creates a profile with the admin role.
pub async fn create_test_admin(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<entities::profile::Model> {
    profile::ensure_profile(db, user_id, &format!("Admin {user_id}"), true).await
}

/// Creates a member profile that already has lifetime premium.
pub async fn create_test_premium_profile(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<entities::profile::Model> {
    create_test_profile(db, user_id).await?;
    profile::set_premium(db, user_id, true).await
}

/// Inserts a pending premium request directly, bypassing proof storage.
///
/// # Defaults
/// * `payment_proof_url`: `"https://proofs.test/{user_id}.png"`
/// * `amount_paid`: 499.0
pub async fn create_test_request(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<entities::premium_request::Model> {
    entities::premium_request::ActiveModel {
        user_id: Set(user_id.to_string()),
        status: Set(RequestStatus::Pending.as_str().to_string()),
        payment_proof_url: Set(format!("https://proofs.test/{user_id}.png")),
        amount_paid: Set(499.0),
        created_at: Set(Utc::now()),
        reviewed_by: Set(None),
        reviewed_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a test expense in the `"Food"` category.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    user_id: &str,
    amount: f64,
    date: NaiveDate,
) -> Result<entities::expense::Model> {
    expense::add_expense(db, user_id, amount, "Food", None, date).await
}

/// Creates a test expense with a custom category.
pub async fn create_custom_expense(
    db: &DatabaseConnection,
    user_id: &str,
    amount: f64,
    category: &str,
    date: NaiveDate,
) -> Result<entities::expense::Model> {
    expense::add_expense(db, user_id, amount, category, None, date).await
}

/// Builds an unsaved expense model for pure aggregation tests.
#[must_use]
pub fn test_expense_model(category: &str, amount: f64, date: NaiveDate) -> entities::expense::Model {
    entities::expense::Model {
        id: 0,
        user_id: "test_user".to_string(),
        amount,
        category: category.to_string(),
        description: None,
        date,
        created_at: Utc::now(),
    }
}

/// Sets up a database with a member profile and one pending request from it.
/// Returns (db, request) for premium workflow tests.
pub async fn setup_with_pending_request(
    user_id: &str,
) -> Result<(DatabaseConnection, entities::premium_request::Model)> {
    let db = setup_test_db().await?;
    create_test_profile(&db, user_id).await?;
    let request = create_test_request(&db, user_id).await?;
    Ok((db, request))
}
