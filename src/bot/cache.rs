//! Per-user cache of generated insight reports.
//!
//! Reports are reused until they are older than the TTL (24 hours by default)
//! or the user explicitly asks for a refresh.

use crate::core::insight::InsightReport;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// How long a report stays fresh.
pub const INSIGHT_TTL_HOURS: i64 = 24;

/// Insight reports keyed by user identity.
#[derive(Debug)]
pub struct InsightCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, InsightReport>>,
}

impl Default for InsightCache {
    fn default() -> Self {
        Self::new(Duration::hours(INSIGHT_TTL_HOURS))
    }
}

impl InsightCache {
    /// Creates an empty cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn is_fresh(&self, report: &InsightReport, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(report.generated_at) < self.ttl
    }

    /// Returns the user's report if it was generated less than one TTL before `now`.
    ///
    /// A stale report is dropped from the cache.
    pub async fn get(&self, user_id: &str, now: DateTime<Utc>) -> Option<InsightReport> {
        {
            let entries = self.entries.read().await;
            match entries.get(user_id) {
                Some(report) if self.is_fresh(report, now) => return Some(report.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        // Re-checked under the write lock; a fresh report may have been put meanwhile
        if entries
            .get(user_id)
            .is_some_and(|report| !self.is_fresh(report, now))
        {
            entries.remove(user_id);
            tracing::debug!(user_id = %user_id, "Evicted stale insights");
        }
        None
    }

    /// Stores a report, replacing any previous one for the user, and evicts
    /// every other stale report.
    pub async fn put(&self, user_id: &str, report: InsightReport) {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, cached| self.is_fresh(cached, now));
        entries.insert(user_id.to_string(), report);
    }

    /// Number of reports currently held, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no reports.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drops the user's report so the next lookup misses.
    pub async fn invalidate(&self, user_id: &str) {
        if self.entries.write().await.remove(user_id).is_some() {
            tracing::debug!(user_id = %user_id, "Invalidated cached insights");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::insight::{FinancialSnapshot, InsightOrigin, RiskLevel, sample_insights};

    fn report(generated_at: DateTime<Utc>) -> InsightReport {
        InsightReport {
            snapshot: FinancialSnapshot {
                budget_amount: 0.0,
                total_spent: 0.0,
                percent_used: 0.0,
                daily_average: 0.0,
                days_until_exhausted: 0,
                top_category: None,
                risk: RiskLevel::Low,
            },
            insights: sample_insights(),
            origin: InsightOrigin::Fallback,
            generated_at,
        }
    }

    #[tokio::test]
    async fn test_fresh_report_is_returned() {
        let cache = InsightCache::default();
        let now = Utc::now();
        cache.put("user1", report(now)).await;

        assert!(cache.get("user1", now + Duration::hours(23)).await.is_some());
        assert!(cache.get("user2", now).await.is_none());
    }

    #[tokio::test]
    async fn test_stale_report_is_ignored() {
        let cache = InsightCache::default();
        let now = Utc::now();
        cache.put("user1", report(now - Duration::hours(24))).await;

        assert!(cache.get("user1", now).await.is_none());
    }

    #[tokio::test]
    async fn test_stale_read_evicts_entry() {
        let cache = InsightCache::new(Duration::hours(1));
        let now = Utc::now();
        cache.put("user1", report(now)).await;
        cache.put("user2", report(now)).await;
        assert_eq!(cache.len().await, 2);

        assert!(cache.get("user1", now + Duration::hours(2)).await.is_none());
        assert_eq!(cache.len().await, 1);

        // A fresh entry is never evicted by a read
        assert!(cache.get("user2", now).await.is_some());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_put_prunes_stale_entries() {
        let cache = InsightCache::new(Duration::hours(1));
        let now = Utc::now();
        cache.put("user1", report(now - Duration::hours(3))).await;
        cache.put("user2", report(now - Duration::hours(2))).await;

        cache.put("user3", report(now)).await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.get("user3", now).await.is_some());

        cache.invalidate("user3").await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = InsightCache::new(Duration::minutes(5));
        let now = Utc::now();
        cache.put("user1", report(now)).await;
        cache.invalidate("user1").await;

        assert!(cache.get("user1", now).await.is_none());
        // Invalidating a missing entry is fine
        cache.invalidate("user1").await;
    }
}
