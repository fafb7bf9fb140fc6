//! Profile entity - One row per identity, created the first time a user interacts.
//!
//! Premium columns are mutated only by the premium workflow (approval, revocation
//! and reconciliation). The `role` column is the explicit reviewer capability.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Unique identifier for the profile
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity of the owner (Discord user ID)
    #[sea_orm(unique)]
    pub user_id: String,
    /// Name shown to reviewers
    pub display_name: String,
    /// Whether the premium tier is unlocked
    pub is_premium: bool,
    /// `"free"` or `"lifetime"`
    pub premium_tier: String,
    /// When premium was granted
    pub premium_since: Option<DateTimeUtc>,
    /// `"member"` or `"admin"`
    pub role: String,
    /// When the profile was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Profile and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One profile has many premium requests
    #[sea_orm(has_many = "super::premium_request::Entity")]
    PremiumRequests,
}

impl Related<super::premium_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PremiumRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
