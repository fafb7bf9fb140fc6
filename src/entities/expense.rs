//! Expense entity - A single ledger row owned by the identity that logged it.
//!
//! Expenses are created and deleted but never updated. The `date` column is the
//! calendar day the money was spent, which may differ from `created_at`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner identity
    pub user_id: String,
    /// Amount spent, always positive
    pub amount: f64,
    /// Free-text category (e.g., "Food", "Transport")
    pub category: String,
    /// Optional note
    pub description: Option<String>,
    /// Calendar day of the expense
    pub date: Date,
    /// When the row was recorded
    pub created_at: DateTimeUtc,
}

/// `Expense` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
