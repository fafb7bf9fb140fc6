//! Budget accounting - budget upsert, period derivation and the spending summary.
//!
//! The summary is read-only and never fails: if the store cannot be reached the
//! caller gets an empty summary, exactly as if no data existed. Store errors are
//! logged before being swallowed.

use crate::{
    core::profile::require_identity,
    entities::{Budget, Expense, budget, expense},
    errors::{Error, Result},
};
use chrono::{Datelike, Days, Local, NaiveDate, Utc};
use sea_orm::{Set, prelude::*};
use serde::Serialize;
use std::{fmt, str::FromStr};

/// Length of a budget period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Sunday through Saturday
    Weekly,
    /// First through last calendar day of the month
    Monthly,
}

impl BudgetPeriod {
    /// Database representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(Error::validation(format!(
                "Period must be 'weekly' or 'monthly', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the caller's current period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    /// The active budget, if one is set
    pub budget: Option<budget::Model>,
    /// First day of the period (inclusive)
    pub period_start: NaiveDate,
    /// Last day of the period (inclusive)
    pub period_end: NaiveDate,
    /// Sum of expenses dated inside the period
    pub total_spent: f64,
    /// Budget left, never below zero
    pub remaining: f64,
    /// Share of the budget used, in `[0, 100]`
    pub percentage_used: f64,
}

impl BudgetSummary {
    /// Summary with no budget and nothing spent.
    #[must_use]
    pub fn empty(today: NaiveDate) -> Self {
        let (period_start, period_end) = period_bounds(BudgetPeriod::Monthly, today);
        Self {
            budget: None,
            period_start,
            period_end,
            total_spent: 0.0,
            remaining: 0.0,
            percentage_used: 0.0,
        }
    }

    /// Amount of the active budget, or zero without one.
    #[must_use]
    pub fn budget_amount(&self) -> f64 {
        self.budget.as_ref().map_or(0.0, |b| b.amount)
    }
}

/// Computes the inclusive `(start, end)` of the period containing `today`.
///
/// Weekly periods start on the most recent Sunday (today if today is Sunday) and
/// end six days later. Monthly periods cover the whole calendar month.
#[must_use]
pub fn period_bounds(period: BudgetPeriod, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    match period {
        BudgetPeriod::Weekly => {
            let offset = u64::from(today.weekday().num_days_from_sunday());
            let start = today - Days::new(offset);
            (start, start + Days::new(6))
        }
        BudgetPeriod::Monthly => {
            let start = today.with_day(1).unwrap_or(today);
            let end = start
                .checked_add_months(chrono::Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(today);
            (start, end)
        }
    }
}

/// Derives `(remaining, percentage_used)` from a budget amount and what was spent.
///
/// `remaining` is floored at zero and `percentage_used` is clamped to `[0, 100]`;
/// a non-positive budget reports zero for both.
#[must_use]
pub fn compute_summary(budget_amount: f64, total_spent: f64) -> (f64, f64) {
    if budget_amount <= 0.0 || !budget_amount.is_finite() {
        return (0.0, 0.0);
    }
    let remaining = (budget_amount - total_spent).max(0.0);
    let percentage_used = (total_spent / budget_amount * 100.0).clamp(0.0, 100.0);
    (remaining, percentage_used)
}

/// Sets the caller's budget, replacing any existing one.
pub async fn set_budget(
    db: &DatabaseConnection,
    user_id: &str,
    amount: f64,
    period: BudgetPeriod,
) -> Result<budget::Model> {
    let user_id = require_identity(user_id)?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let now = Utc::now();
    let result = if let Some(existing) = get_budget(db, user_id).await? {
        let mut active: budget::ActiveModel = existing.into();
        active.amount = Set(amount);
        active.period = Set(period.as_str().to_string());
        active.updated_at = Set(now);
        active.update(db).await?
    } else {
        let active = budget::ActiveModel {
            user_id: Set(user_id.to_string()),
            amount: Set(amount),
            period: Set(period.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        active.insert(db).await?
    };

    tracing::info!(user_id = %user_id, amount, period = %period, "Budget set");
    Ok(result)
}

/// Gets the caller's budget, if one is set.
pub async fn get_budget(db: &DatabaseConnection, user_id: &str) -> Result<Option<budget::Model>> {
    Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Sums the caller's expenses dated within `[start, end]`.
pub async fn total_spent_between(
    db: &DatabaseConnection,
    user_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<f64> {
    let expenses = Expense::find()
        .filter(expense::Column::UserId.eq(user_id))
        .filter(expense::Column::Date.between(start, end))
        .all(db)
        .await?;
    Ok(expenses.iter().map(|e| e.amount).sum())
}

async fn try_summary(
    db: &DatabaseConnection,
    user_id: &str,
    today: NaiveDate,
) -> Result<BudgetSummary> {
    let budget = get_budget(db, user_id).await?;

    let period = match &budget {
        Some(b) => b.period.parse()?,
        None => BudgetPeriod::Monthly,
    };
    let (period_start, period_end) = period_bounds(period, today);
    let total_spent = total_spent_between(db, user_id, period_start, period_end).await?;
    let (remaining, percentage_used) =
        compute_summary(budget.as_ref().map_or(0.0, |b| b.amount), total_spent);

    Ok(BudgetSummary {
        budget,
        period_start,
        period_end,
        total_spent,
        remaining,
        percentage_used,
    })
}

/// Builds the caller's summary for the period containing `today`.
///
/// Without a budget, spending is measured over the current calendar month and
/// `remaining`/`percentage_used` are zero. Store failures yield an empty summary.
pub async fn get_budget_summary_on(
    db: &DatabaseConnection,
    user_id: &str,
    today: NaiveDate,
) -> Result<BudgetSummary> {
    let user_id = require_identity(user_id)?;
    match try_summary(db, user_id, today).await {
        Ok(summary) => Ok(summary),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Failed to build budget summary");
            Ok(BudgetSummary::empty(today))
        }
    }
}

/// Builds the caller's summary for the current local date.
pub async fn get_budget_summary(db: &DatabaseConnection, user_id: &str) -> Result<BudgetSummary> {
    get_budget_summary_on(db, user_id, Local::now().date_naive()).await
}
