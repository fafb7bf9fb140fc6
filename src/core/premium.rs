//! Premium upgrade workflow.
//!
//! A request moves `pending -> approved` or `pending -> rejected` exactly once.
//! Review is restricted to profiles with the admin role. Approval updates the
//! request and the requester's profile in one database transaction; submission
//! removes the stored proof again if the request row cannot be written.
//! [`reconcile_approved`] repairs approved requests whose profile was never
//! upgraded (e.g. rows written before approval was transactional).

use crate::{
    config::settings::PremiumConfig,
    core::{
        profile::{self, require_admin, require_identity},
        upload::{ArtifactStore, ProofArtifact, artifact_path},
    },
    entities::{PremiumRequest, Profile, premium_request, profile as profile_entity},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use std::{fmt, str::FromStr};

/// Lifecycle state of a premium request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Awaiting review
    Pending,
    /// Accepted; the requester is premium
    Approved,
    /// Declined
    Rejected,
}

impl RequestStatus {
    /// Database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the request can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for RequestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(Error::validation(format!("Unknown request status '{other}'"))),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending request together with the requester's display name.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// The request
    pub request: premium_request::Model,
    /// Requester's display name, if their profile exists
    pub requester_name: Option<String>,
}

/// Submits an upgrade request with a payment proof.
///
/// The proof is stored first; the request row is written only if that succeeds.
/// `amount_paid` is always the configured price. If the row cannot be written the
/// stored proof is removed again.
pub async fn submit_request<S>(
    db: &DatabaseConnection,
    store: &S,
    pricing: &PremiumConfig,
    user_id: &str,
    proof: Option<ProofArtifact>,
) -> Result<premium_request::Model>
where
    S: ArtifactStore,
{
    let user_id = require_identity(user_id)?;

    let Some(proof) = proof.filter(|p| !p.bytes.is_empty()) else {
        return Err(Error::validation("A payment proof file is required"));
    };

    let now = Utc::now();
    let path = artifact_path(user_id, now.timestamp_millis(), &proof.file_name);
    let url = store.store(&path, &proof.bytes).await?;

    let request = premium_request::ActiveModel {
        user_id: Set(user_id.to_string()),
        status: Set(RequestStatus::Pending.as_str().to_string()),
        payment_proof_url: Set(url),
        amount_paid: Set(pricing.price),
        created_at: Set(now),
        reviewed_by: Set(None),
        reviewed_at: Set(None),
        ..Default::default()
    };

    match request.insert(db).await {
        Ok(model) => {
            tracing::info!(user_id = %user_id, request_id = model.id, "Premium request submitted");
            Ok(model)
        }
        Err(e) => {
            if let Err(cleanup) = store.remove(&path).await {
                tracing::error!(path = %path, error = %cleanup, "Failed to remove orphaned proof");
            }
            Err(e.into())
        }
    }
}

/// Moves a pending request to `target`, or explains why it cannot move.
async fn transition<C>(
    db: &C,
    reviewer_id: &str,
    request_id: i64,
    target: RequestStatus,
) -> Result<premium_request::Model>
where
    C: ConnectionTrait,
{
    let updated = PremiumRequest::update_many()
        .col_expr(premium_request::Column::Status, Expr::value(target.as_str()))
        .col_expr(premium_request::Column::ReviewedBy, Expr::value(reviewer_id))
        .col_expr(premium_request::Column::ReviewedAt, Expr::value(Utc::now()))
        .filter(premium_request::Column::Id.eq(request_id))
        .filter(premium_request::Column::Status.eq(RequestStatus::Pending.as_str()))
        .exec(db)
        .await?;

    let request = PremiumRequest::find_by_id(request_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "Premium request",
            id: request_id.to_string(),
        })?;

    if updated.rows_affected == 0 {
        return Err(Error::InvalidTransition {
            id: request_id,
            status: request.status,
        });
    }
    Ok(request)
}

/// Approves a pending request and upgrades the requester to lifetime premium.
///
/// Both writes happen in one transaction. Approving a request that was already
/// reviewed fails with [`Error::InvalidTransition`].
pub async fn approve_request(
    db: &DatabaseConnection,
    reviewer_id: &str,
    request_id: i64,
) -> Result<premium_request::Model> {
    let reviewer = require_admin(db, reviewer_id).await?;

    let txn = db.begin().await?;
    let request = transition(&txn, &reviewer.user_id, request_id, RequestStatus::Approved).await?;
    profile::set_premium(&txn, &request.user_id, true).await?;
    txn.commit().await?;

    tracing::info!(
        reviewer = %reviewer.user_id,
        request_id,
        user_id = %request.user_id,
        "Premium request approved"
    );
    Ok(request)
}

/// Rejects a pending request. The requester's profile is left untouched.
pub async fn reject_request(
    db: &DatabaseConnection,
    reviewer_id: &str,
    request_id: i64,
) -> Result<premium_request::Model> {
    let reviewer = require_admin(db, reviewer_id).await?;
    let request = transition(db, &reviewer.user_id, request_id, RequestStatus::Rejected).await?;

    tracing::info!(reviewer = %reviewer.user_id, request_id, "Premium request rejected");
    Ok(request)
}

/// Lists pending requests newest first with the requester's display name.
pub async fn list_pending(
    db: &DatabaseConnection,
    reviewer_id: &str,
) -> Result<Vec<PendingRequest>> {
    require_admin(db, reviewer_id).await?;

    let rows = PremiumRequest::find()
        .filter(premium_request::Column::Status.eq(RequestStatus::Pending.as_str()))
        .order_by_desc(premium_request::Column::CreatedAt)
        .order_by_desc(premium_request::Column::Id)
        .find_also_related(Profile)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(request, requester)| PendingRequest {
            request,
            requester_name: requester.map(|p| p.display_name),
        })
        .collect())
}

/// Gets the caller's most recent request, if any.
pub async fn latest_request(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Option<premium_request::Model>> {
    let user_id = require_identity(user_id)?;
    PremiumRequest::find()
        .filter(premium_request::Column::UserId.eq(user_id))
        .order_by_desc(premium_request::Column::CreatedAt)
        .order_by_desc(premium_request::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Downgrades a user back to the free tier. Their requests are not modified.
pub async fn revoke_premium(
    db: &DatabaseConnection,
    reviewer_id: &str,
    user_id: &str,
) -> Result<profile_entity::Model> {
    let reviewer = require_admin(db, reviewer_id).await?;
    let user_id = require_identity(user_id)?;

    let updated = profile::set_premium(db, user_id, false).await?;
    tracing::info!(reviewer = %reviewer.user_id, user_id = %user_id, "Premium revoked");
    Ok(updated)
}

/// Upgrades every profile that has an approved request but is not premium.
///
/// Returns the number of profiles repaired. Running it again right away repairs
/// nothing.
pub async fn reconcile_approved(db: &DatabaseConnection, reviewer_id: &str) -> Result<usize> {
    require_admin(db, reviewer_id).await?;

    let approved = PremiumRequest::find()
        .filter(premium_request::Column::Status.eq(RequestStatus::Approved.as_str()))
        .find_also_related(Profile)
        .all(db)
        .await?;

    let mut repaired = 0;
    for (request, requester) in approved {
        match requester {
            Some(p) if !p.is_premium => {
                profile::set_premium(db, &p.user_id, true).await?;
                tracing::warn!(
                    user_id = %p.user_id,
                    request_id = request.id,
                    "Repaired approved request without premium profile"
                );
                repaired += 1;
            }
            Some(_) => {}
            None => {
                tracing::warn!(
                    user_id = %request.user_id,
                    request_id = request.id,
                    "Approved request has no profile to upgrade"
                );
            }
        }
    }
    Ok(repaired)
}
