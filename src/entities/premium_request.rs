//! Premium request entity - A user's one-time-payment upgrade request.
//!
//! Each request starts as `"pending"` and leaves that state exactly once, to
//! `"approved"` or `"rejected"`. `reviewed_by`/`reviewed_at` are filled on review.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Premium request database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "premium_requests")]
pub struct Model {
    /// Unique identifier for the request
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity of the requester
    pub user_id: String,
    /// `"pending"`, `"approved"`, or `"rejected"`
    pub status: String,
    /// Public URL of the uploaded payment proof
    pub payment_proof_url: String,
    /// Price recorded at submission time
    pub amount_paid: f64,
    /// When the request was submitted
    pub created_at: DateTimeUtc,
    /// Identity of the reviewer
    pub reviewed_by: Option<String>,
    /// When the request was reviewed
    pub reviewed_at: Option<DateTimeUtc>,
}

/// `PremiumRequest` has no schema-level relations; profiles are created lazily,
/// so `user_id` is a soft reference resolved through [`Related`].
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Entity::belongs_to(super::profile::Entity)
            .from(Column::UserId)
            .to(super::profile::Column::UserId)
            .into()
    }
}

impl ActiveModelBehavior for ActiveModel {}
