//! Expense ledger - create, list and delete the caller's expenses, plus the
//! aggregations the presentation layer charts.
//!
//! Every query is filtered by the caller's identity. Deleting an id the caller
//! does not own behaves exactly like deleting an id that does not exist: nothing
//! happens and no error is raised.

use crate::{
    core::{
        budget::{BudgetPeriod, period_bounds},
        profile::require_identity,
    },
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::{Days, NaiveDate, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Colors assigned to categories, cycled in order of spending.
pub const CATEGORY_PALETTE: [&str; 8] = [
    "#4F46E5", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4", "#EC4899", "#84CC16",
];

/// Longest accepted category, in characters.
pub const MAX_CATEGORY_LEN: usize = 50;

/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Window lengths accepted by [`daily_spending`].
pub const DAILY_WINDOWS: [u32; 3] = [7, 14, 30];

/// Total spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// Category name as entered
    pub category: String,
    /// Summed amount
    pub total: f64,
    /// Chart color from [`CATEGORY_PALETTE`]
    pub color: &'static str,
}

/// Total spent on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    /// The day
    pub date: NaiveDate,
    /// Summed amount, zero when nothing was spent
    pub total: f64,
}

/// Records an expense for the caller.
///
/// The category is trimmed, must not be empty and is at most [`MAX_CATEGORY_LEN`]
/// characters; it is not checked against the suggested list. A blank description
/// is stored as `None`; longer than [`MAX_DESCRIPTION_LEN`] is rejected.
pub async fn add_expense(
    db: &DatabaseConnection,
    user_id: &str,
    amount: f64,
    category: &str,
    description: Option<String>,
    date: NaiveDate,
) -> Result<expense::Model> {
    let user_id = require_identity(user_id)?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let category = category.trim();
    if category.is_empty() {
        return Err(Error::validation("Category cannot be empty"));
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(Error::validation(format!(
            "Category must be at most {MAX_CATEGORY_LEN} characters"
        )));
    }

    let description = description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    if description
        .as_ref()
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
    {
        return Err(Error::validation(format!(
            "Description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }

    let expense = expense::ActiveModel {
        user_id: Set(user_id.to_string()),
        amount: Set(amount),
        category: Set(category.to_string()),
        description: Set(description),
        date: Set(date),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = expense.insert(db).await?;
    tracing::info!(user_id = %user_id, expense_id = result.id, amount, "Expense added");
    Ok(result)
}

async fn query_expenses(
    db: &DatabaseConnection,
    user_id: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    limit: Option<u64>,
) -> Result<Vec<expense::Model>> {
    let mut query = Expense::find().filter(expense::Column::UserId.eq(user_id));
    if let Some(start) = start {
        query = query.filter(expense::Column::Date.gte(start));
    }
    if let Some(end) = end {
        query = query.filter(expense::Column::Date.lte(end));
    }

    query
        .order_by_desc(expense::Column::Date)
        .order_by_desc(expense::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the caller's expenses newest first, optionally bounded by an inclusive date range.
///
/// A store failure is logged and reported as an empty list.
pub async fn get_expenses(
    db: &DatabaseConnection,
    user_id: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<expense::Model>> {
    let user_id = require_identity(user_id)?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(Error::validation("Start date must not be after end date"));
        }
    }

    Ok(query_expenses(db, user_id, start, end, None)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to list expenses");
            Vec::new()
        }))
}

/// Lists at most `limit` of the caller's most recent expenses.
pub async fn get_recent_expenses(
    db: &DatabaseConnection,
    user_id: &str,
    limit: u64,
) -> Result<Vec<expense::Model>> {
    let user_id = require_identity(user_id)?;
    Ok(query_expenses(db, user_id, None, None, Some(limit))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to list recent expenses");
            Vec::new()
        }))
}

/// Deletes one of the caller's expenses.
///
/// Returns `true` if a row was removed. Ids that do not exist or belong to
/// someone else return `false`.
pub async fn delete_expense(db: &DatabaseConnection, user_id: &str, expense_id: i64) -> Result<bool> {
    let user_id = require_identity(user_id)?;

    let result = Expense::delete_many()
        .filter(expense::Column::Id.eq(expense_id))
        .filter(expense::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        tracing::debug!(user_id = %user_id, expense_id, "Delete matched no owned expense");
    }
    Ok(result.rows_affected > 0)
}

/// Groups expenses by category, largest total first, assigning palette colors in that order.
#[must_use]
pub fn bucket_by_category(expenses: &[expense::Model]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for e in expenses {
        *totals.entry(e.category.as_str()).or_default() += e.amount;
    }

    let mut sorted: Vec<(&str, f64)> = totals.into_iter().collect();
    // Stable sort keeps alphabetical order among equal totals
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, (category, total))| CategoryTotal {
            category: category.to_string(),
            total,
            color: CATEGORY_PALETTE[i % CATEGORY_PALETTE.len()],
        })
        .collect()
}

/// Builds a series of exactly `days` entries ending at `today`, ascending, with
/// zero for days without expenses. Expenses outside the window are ignored.
#[must_use]
pub fn fill_daily_series(expenses: &[expense::Model], days: u32, today: NaiveDate) -> Vec<DailyTotal> {
    let mut by_day: HashMap<NaiveDate, f64> = HashMap::new();
    for e in expenses {
        *by_day.entry(e.date).or_default() += e.amount;
    }

    (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .map(|date| DailyTotal {
            date,
            total: by_day.get(&date).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Category totals for the calendar month containing `today`.
pub async fn category_breakdown(
    db: &DatabaseConnection,
    user_id: &str,
    today: NaiveDate,
) -> Result<Vec<CategoryTotal>> {
    let (start, end) = period_bounds(BudgetPeriod::Monthly, today);
    let expenses = get_expenses(db, user_id, Some(start), Some(end)).await?;
    Ok(bucket_by_category(&expenses))
}

/// Daily totals for the trailing `days` (7, 14 or 30) ending at `today`.
pub async fn daily_spending(
    db: &DatabaseConnection,
    user_id: &str,
    days: u32,
    today: NaiveDate,
) -> Result<Vec<DailyTotal>> {
    if !DAILY_WINDOWS.contains(&days) {
        return Err(Error::validation(format!(
            "Days must be one of 7, 14 or 30, got {days}"
        )));
    }
    let start = today
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .unwrap_or(today);
    let expenses = get_expenses(db, user_id, Some(start), Some(today)).await?;
    Ok(fill_daily_series(&expenses, days, today))
}
