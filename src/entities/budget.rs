//! Budget entity - At most one budget per owner, updated in place.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner identity; unique so a user has a single active budget
    #[sea_orm(unique)]
    pub user_id: String,
    /// Budget amount per period
    pub amount: f64,
    /// `"weekly"` or `"monthly"`
    pub period: String,
    /// When the budget was first set
    pub created_at: DateTimeUtc,
    /// When the budget was last changed
    pub updated_at: DateTimeUtc,
}

/// `Budget` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
