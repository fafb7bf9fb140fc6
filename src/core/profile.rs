//! Profile business logic - identity checks, profile creation and capability gates.
//!
//! A profile is created the first time an identity is seen. The two capability
//! gates are independent: [`require_premium`] unlocks paid features,
//! [`require_admin`] unlocks premium request review.

use crate::{
    entities::{Profile, profile},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use std::{fmt, str::FromStr};

/// Premium tier stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremiumTier {
    /// Default tier
    Free,
    /// One-time payment, never expires
    Lifetime,
}

impl PremiumTier {
    /// Database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Lifetime => "lifetime",
        }
    }
}

impl FromStr for PremiumTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "free" => Ok(Self::Free),
            "lifetime" => Ok(Self::Lifetime),
            other => Err(Error::validation(format!("Unknown premium tier '{other}'"))),
        }
    }
}

impl fmt::Display for PremiumTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability role stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Regular user
    Member,
    /// May review premium requests
    Admin,
}

impl Role {
    /// Database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
        }
    }
}

/// Returns the trimmed identity, or an [`Error::Auth`] if it is blank.
///
/// Every service entry point calls this before touching the store.
pub fn require_identity(user_id: &str) -> Result<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(Error::Auth {
            message: "no authenticated identity".to_string(),
        });
    }
    Ok(trimmed)
}

/// Whether the stored role string grants review rights.
#[must_use]
pub fn is_admin(profile: &profile::Model) -> bool {
    profile.role == Role::Admin.as_str()
}

/// Gets the caller's profile, creating it on first sight.
///
/// The display name and role are refreshed on every call so renames and changes
/// to the reviewer roster take effect without a migration.
pub async fn ensure_profile(
    db: &DatabaseConnection,
    user_id: &str,
    display_name: &str,
    admin: bool,
) -> Result<profile::Model> {
    let user_id = require_identity(user_id)?;
    let role = if admin { Role::Admin } else { Role::Member };

    if let Some(existing) = get_profile(db, user_id).await? {
        if existing.display_name == display_name && existing.role == role.as_str() {
            return Ok(existing);
        }
        let mut active: profile::ActiveModel = existing.into();
        active.display_name = Set(display_name.to_string());
        active.role = Set(role.as_str().to_string());
        return active.update(db).await.map_err(Into::into);
    }

    tracing::info!(user_id = %user_id, "Creating profile");
    let profile = profile::ActiveModel {
        user_id: Set(user_id.to_string()),
        display_name: Set(display_name.to_string()),
        is_premium: Set(false),
        premium_tier: Set(PremiumTier::Free.as_str().to_string()),
        premium_since: Set(None),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    profile.insert(db).await.map_err(Into::into)
}

/// Finds a profile by identity.
pub async fn get_profile<C>(db: &C, user_id: &str) -> Result<Option<profile::Model>>
where
    C: ConnectionTrait,
{
    Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the caller's profile if it is premium, [`Error::PremiumRequired`] otherwise.
pub async fn require_premium(db: &DatabaseConnection, user_id: &str) -> Result<profile::Model> {
    let user_id = require_identity(user_id)?;
    match get_profile(db, user_id).await? {
        Some(profile) if profile.is_premium => Ok(profile),
        _ => Err(Error::PremiumRequired),
    }
}

/// Returns the caller's profile if it carries the admin role, [`Error::Forbidden`] otherwise.
pub async fn require_admin<C>(db: &C, user_id: &str) -> Result<profile::Model>
where
    C: ConnectionTrait,
{
    let user_id = require_identity(user_id)?;
    match get_profile(db, user_id).await? {
        Some(profile) if is_admin(&profile) => Ok(profile),
        _ => Err(Error::Forbidden {
            message: "only reviewers can manage premium requests".to_string(),
        }),
    }
}

/// Sets the premium columns of a profile. Used by the premium workflow only.
pub(crate) async fn set_premium<C>(
    db: &C,
    user_id: &str,
    premium: bool,
) -> Result<profile::Model>
where
    C: ConnectionTrait,
{
    let existing = get_profile(db, user_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "Profile",
            id: user_id.to_string(),
        })?;

    let mut active: profile::ActiveModel = existing.into();
    active.is_premium = Set(premium);
    if premium {
        active.premium_tier = Set(PremiumTier::Lifetime.as_str().to_string());
        active.premium_since = Set(Some(Utc::now()));
    } else {
        active.premium_tier = Set(PremiumTier::Free.as_str().to_string());
        active.premium_since = Set(None);
    }
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_blank_identity_is_auth_error() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = ensure_profile(&db, "   ", "Nobody", false).await;
        assert!(matches!(result.unwrap_err(), Error::Auth { .. }));

        let result = require_premium(&db, "").await;
        assert!(matches!(result.unwrap_err(), Error::Auth { .. }));
    }

    #[tokio::test]
    async fn test_ensure_profile_creates_once() -> Result<()> {
        let db = setup_test_db().await?;

        let first = ensure_profile(&db, "user1", "Alice", false).await?;
        let second = ensure_profile(&db, "user1", "Alice", false).await?;

        assert_eq!(first.id, second.id);
        assert!(!first.is_premium);
        assert_eq!(first.premium_tier, "free");
        assert_eq!(first.role, "member");
        assert_eq!(Profile::find().count(&db).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_profile_refreshes_name_and_role() -> Result<()> {
        let db = setup_test_db().await?;

        ensure_profile(&db, "user1", "Alice", false).await?;
        let updated = ensure_profile(&db, "user1", "Alice B", true).await?;

        assert_eq!(updated.display_name, "Alice B");
        assert!(is_admin(&updated));

        Ok(())
    }

    #[tokio::test]
    async fn test_premium_is_not_admin() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_profile(&db, "user1").await?;
        set_premium(&db, "user1", true).await?;

        assert!(require_premium(&db, "user1").await.is_ok());
        assert!(matches!(
            require_admin(&db, "user1").await.unwrap_err(),
            Error::Forbidden { .. }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_require_premium_for_free_and_unknown_users() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_profile(&db, "user1").await?;

        assert!(matches!(
            require_premium(&db, "user1").await.unwrap_err(),
            Error::PremiumRequired
        ));
        assert!(matches!(
            require_premium(&db, "ghost").await.unwrap_err(),
            Error::PremiumRequired
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_set_premium_and_downgrade() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_profile(&db, "user1").await?;

        let premium = set_premium(&db, "user1", true).await?;
        assert!(premium.is_premium);
        assert_eq!(premium.premium_tier, "lifetime");
        assert!(premium.premium_since.is_some());

        let free = set_premium(&db, "user1", false).await?;
        assert!(!free.is_premium);
        assert_eq!(free.premium_tier, "free");
        assert!(free.premium_since.is_none());

        Ok(())
    }

    #[test]
    fn test_premium_tier_parsing() {
        assert_eq!("lifetime".parse::<PremiumTier>().unwrap(), PremiumTier::Lifetime);
        assert!("gold".parse::<PremiumTier>().is_err());
    }
}
