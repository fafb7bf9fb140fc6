//! Insight generation - turns a budget summary into four short, labeled insights.
//!
//! The generative path asks an external model for exactly four JSON objects. Its
//! reply is validated strictly; anything unexpected (transport error, missing
//! configuration, malformed JSON, wrong count, unknown icon, overlong title)
//! falls back to [`fallback_insights`], which is a pure function of the snapshot.

use crate::{
    core::{
        budget::{BudgetSummary, get_budget_summary_on},
        expense::{bucket_by_category, get_expenses},
        profile::require_premium,
    },
    entities::expense,
    errors::{Error, Result},
};
use chrono::{DateTime, Days, NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Number of insights produced on either path.
pub const INSIGHT_COUNT: usize = 4;

/// Trailing window used for the daily average and top category.
pub const TRAILING_DAYS: u32 = 30;

const MAX_TITLE_WORDS: usize = 5;

/// Discrete classification of how much of the budget is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Under 40% used
    Low,
    /// 40% to 75% used
    Moderate,
    /// Over 75% used
    High,
}

impl RiskLevel {
    /// Classifies a usage percentage.
    #[must_use]
    pub fn from_percent(percent_used: f64) -> Self {
        if percent_used > 75.0 {
            Self::High
        } else if percent_used >= 40.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Lowercase label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

/// Icon shown next to an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightIcon {
    /// Something needs attention
    Warning,
    /// Spending is rising
    TrendingUp,
    /// Spending is falling
    TrendingDown,
    /// Goal or budget related
    Target,
    /// Tip
    Lightbulb,
    /// Savings
    PiggyBank,
}

/// Category of an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    /// Risk the user should act on
    Warning,
    /// Actionable suggestion
    Tip,
    /// Positive feedback
    Success,
    /// Neutral observation
    Info,
}

/// One insight, serialized as `{icon, title, description, type}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    /// Icon
    pub icon: InsightIcon,
    /// Short title, at most five words
    pub title: String,
    /// One or two sentences
    pub description: String,
    /// Category of the insight
    #[serde(rename = "type")]
    pub kind: InsightKind,
}

impl Insight {
    fn new(icon: InsightIcon, kind: InsightKind, title: &str, description: String) -> Self {
        Self {
            icon,
            title: title.to_string(),
            description,
            kind,
        }
    }
}

/// Numbers the insights are derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSnapshot {
    /// Current budget, zero without one
    pub budget_amount: f64,
    /// Spent in the current period
    pub total_spent: f64,
    /// Share of the budget used, `[0, 100]`
    pub percent_used: f64,
    /// Average daily spend over the trailing 30 days
    pub daily_average: f64,
    /// Whole days until the budget runs out at the current pace; zero when
    /// nothing is being spent or the budget is already gone
    pub days_until_exhausted: i64,
    /// Category with the highest trailing spend
    pub top_category: Option<String>,
    /// Risk tier derived from `percent_used`
    pub risk: RiskLevel,
}

/// Where a set of insights came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightOrigin {
    /// Produced by the external model
    Generated,
    /// Produced by [`fallback_insights`]
    Fallback,
}

/// Snapshot plus the insights produced from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightReport {
    /// Input numbers
    pub snapshot: FinancialSnapshot,
    /// Exactly [`INSIGHT_COUNT`] insights
    pub insights: Vec<Insight>,
    /// Which path produced them
    pub origin: InsightOrigin,
    /// When they were produced
    pub generated_at: DateTime<Utc>,
}

/// Something that completes a text prompt, e.g. a hosted language model.
pub trait InsightSource {
    /// Sends `prompt` and returns the raw text reply.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Derives the snapshot from the current summary and the trailing 30 days of expenses.
#[must_use]
pub fn build_snapshot(summary: &BudgetSummary, trailing: &[expense::Model]) -> FinancialSnapshot {
    let budget_amount = summary.budget_amount();
    let total_spent = summary.total_spent;
    let trailing_total: f64 = trailing.iter().map(|e| e.amount).sum();
    let daily_average = trailing_total / f64::from(TRAILING_DAYS);

    let left = budget_amount - total_spent;
    let days_until_exhausted = if daily_average <= 0.0 || left <= 0.0 {
        0
    } else {
        // Cast safety: both operands are positive and finite; saturates on overflow
        #[allow(clippy::cast_possible_truncation)]
        let days = (left / daily_average).floor() as i64;
        days
    };

    FinancialSnapshot {
        budget_amount,
        total_spent,
        percent_used: summary.percentage_used,
        daily_average,
        days_until_exhausted,
        top_category: bucket_by_category(trailing)
            .into_iter()
            .next()
            .map(|c| c.category),
        risk: RiskLevel::from_percent(summary.percentage_used),
    }
}

/// Deterministic insights keyed by risk tier and projected runway.
#[must_use]
pub fn fallback_insights(snapshot: &FinancialSnapshot) -> Vec<Insight> {
    use InsightIcon as Icon;
    use InsightKind as Kind;

    let pct = snapshot.percent_used;
    let has_budget = snapshot.budget_amount > 0.0;

    let status = if !has_budget {
        Insight::new(
            Icon::Target,
            Kind::Tip,
            "Set A Budget",
            "Set a weekly or monthly budget to see how much you have left to spend.".to_string(),
        )
    } else {
        match snapshot.risk {
            RiskLevel::High => Insight::new(
                Icon::Warning,
                Kind::Warning,
                "Budget Nearly Exhausted",
                format!(
                    "You've used {pct:.0}% of your budget. Pause non-essential spending until the period resets."
                ),
            ),
            RiskLevel::Moderate => Insight::new(
                Icon::Target,
                Kind::Info,
                "Spending On Track",
                format!(
                    "You've used {pct:.0}% of your budget. Keep an eye on discretionary purchases."
                ),
            ),
            RiskLevel::Low => Insight::new(
                Icon::PiggyBank,
                Kind::Success,
                "Healthy Budget Usage",
                format!("Only {pct:.0}% of your budget is used. You're well within your limits."),
            ),
        }
    };

    let days = snapshot.days_until_exhausted;
    let avg = snapshot.daily_average;
    let runway = if has_budget && snapshot.total_spent >= snapshot.budget_amount {
        Insight::new(
            Icon::Warning,
            Kind::Warning,
            "Budget Exceeded",
            format!(
                "You've spent {:.2} against a budget of {:.2} this period.",
                snapshot.total_spent, snapshot.budget_amount
            ),
        )
    } else if avg <= 0.0 {
        Insight::new(
            Icon::TrendingDown,
            Kind::Info,
            "No Recent Spending",
            "There is no spending in the last 30 days to project from.".to_string(),
        )
    } else if !has_budget {
        Insight::new(
            Icon::TrendingUp,
            Kind::Info,
            "Daily Spending Average",
            format!("You spend about {avg:.2} per day on average over the last 30 days."),
        )
    } else if days < 7 {
        Insight::new(
            Icon::TrendingUp,
            Kind::Warning,
            "Budget Running Low",
            format!("At {avg:.2} per day, your budget lasts about {days} more days."),
        )
    } else if days < 30 {
        Insight::new(
            Icon::TrendingUp,
            Kind::Info,
            "Steady Spending Pace",
            format!("At {avg:.2} per day, your budget lasts about {days} more days."),
        )
    } else {
        Insight::new(
            Icon::TrendingDown,
            Kind::Success,
            "Comfortable Runway",
            format!("At {avg:.2} per day, your budget would last {days} more days."),
        )
    };

    let focus = match &snapshot.top_category {
        Some(category) => Insight::new(
            Icon::Lightbulb,
            Kind::Tip,
            "Top Spending Category",
            format!(
                "{category} is where most of your money went in the last 30 days. Review it for savings."
            ),
        ),
        None => Insight::new(
            Icon::Lightbulb,
            Kind::Tip,
            "Start Logging Expenses",
            "Log expenses regularly so insights can spot your spending patterns.".to_string(),
        ),
    };

    let habit = match snapshot.risk {
        RiskLevel::High => Insight::new(
            Icon::Lightbulb,
            Kind::Tip,
            "Try A Spending Freeze",
            "Pick two no-spend days this week to slow your spending down.".to_string(),
        ),
        RiskLevel::Moderate => Insight::new(
            Icon::Lightbulb,
            Kind::Tip,
            "Plan Upcoming Purchases",
            "List planned purchases for the rest of the period and postpone what can wait."
                .to_string(),
        ),
        RiskLevel::Low => Insight::new(
            Icon::PiggyBank,
            Kind::Success,
            "Save The Surplus",
            "Consider moving part of your remaining budget into savings.".to_string(),
        ),
    };

    vec![status, runway, focus, habit]
}

/// Static examples shown to users without premium.
#[must_use]
pub fn sample_insights() -> Vec<Insight> {
    vec![
        Insight::new(
            InsightIcon::Target,
            InsightKind::Info,
            "Spending On Track",
            "You've used 52% of your budget halfway through the month.".to_string(),
        ),
        Insight::new(
            InsightIcon::TrendingUp,
            InsightKind::Warning,
            "Food Costs Rising",
            "Food spending is 18% higher than last month.".to_string(),
        ),
        Insight::new(
            InsightIcon::Lightbulb,
            InsightKind::Tip,
            "Cook At Home",
            "Two home-cooked dinners a week could save around 1,200 this month.".to_string(),
        ),
        Insight::new(
            InsightIcon::PiggyBank,
            InsightKind::Success,
            "Savings Opportunity",
            "At this pace you could set aside 15% of your budget.".to_string(),
        ),
    ]
}

/// Builds the prompt sent to the generative API.
#[must_use]
pub fn build_prompt(snapshot: &FinancialSnapshot) -> String {
    let mut prompt = String::from(
        "You are a personal finance assistant. Analyze this user's budget data and \
         return exactly 4 insights.\n\nFinancial data:\n",
    );
    // Writing to a String cannot fail
    let _ = writeln!(prompt, "- Budget: {:.2}", snapshot.budget_amount);
    let _ = writeln!(prompt, "- Spent this period: {:.2}", snapshot.total_spent);
    let _ = writeln!(prompt, "- Budget used: {:.1}%", snapshot.percent_used);
    let _ = writeln!(prompt, "- Average daily spend (30 days): {:.2}", snapshot.daily_average);
    let _ = writeln!(
        prompt,
        "- Days until budget runs out: {}",
        snapshot.days_until_exhausted
    );
    let _ = writeln!(
        prompt,
        "- Top spending category: {}",
        snapshot.top_category.as_deref().unwrap_or("none")
    );
    let _ = writeln!(prompt, "- Risk level: {}", snapshot.risk.as_str());
    prompt.push_str(
        "\nRespond with only a JSON array of exactly 4 objects, each shaped:\n\
         {\"icon\": \"warning\" | \"trending-up\" | \"trending-down\" | \"target\" | \"lightbulb\" | \"piggy-bank\", \
         \"title\": \"at most 5 words\", \
         \"description\": \"one or two sentences\", \
         \"type\": \"warning\" | \"tip\" | \"success\" | \"info\"}\n",
    );
    prompt
}

/// Parses and validates a model reply.
///
/// Surrounding prose or code fences are tolerated by taking the outermost JSON
/// array. The array must hold exactly four well-formed insights.
pub fn parse_insights(raw: &str) -> Result<Vec<Insight>> {
    let (Some(start), Some(end)) = (raw.find('['), raw.rfind(']')) else {
        return Err(Error::ExternalService {
            message: "reply contains no JSON array".to_string(),
        });
    };
    if end < start {
        return Err(Error::ExternalService {
            message: "reply contains no JSON array".to_string(),
        });
    }

    let insights: Vec<Insight> =
        serde_json::from_str(&raw[start..=end]).map_err(|e| Error::ExternalService {
            message: format!("reply does not match the insight schema: {e}"),
        })?;

    validate_insights(&insights)?;
    Ok(insights)
}

fn validate_insights(insights: &[Insight]) -> Result<()> {
    if insights.len() != INSIGHT_COUNT {
        return Err(Error::ExternalService {
            message: format!("expected {INSIGHT_COUNT} insights, got {}", insights.len()),
        });
    }
    for insight in insights {
        let words = insight.title.split_whitespace().count();
        if words == 0 || words > MAX_TITLE_WORDS {
            return Err(Error::ExternalService {
                message: format!("title '{}' must have 1-{MAX_TITLE_WORDS} words", insight.title),
            });
        }
        if insight.description.trim().is_empty() {
            return Err(Error::ExternalService {
                message: "insight description is empty".to_string(),
            });
        }
    }
    Ok(())
}

async fn try_generate<S: InsightSource>(source: &S, snapshot: &FinancialSnapshot) -> Result<Vec<Insight>> {
    let reply = source.complete(&build_prompt(snapshot)).await?;
    parse_insights(&reply)
}

/// Produces insights for a snapshot, preferring `source` and falling back on any failure.
///
/// Never fails; a missing source or any error from it yields the fallback set.
pub async fn generate_insights<S: InsightSource>(
    snapshot: FinancialSnapshot,
    source: Option<&S>,
) -> InsightReport {
    let generated = match source {
        Some(source) => match try_generate(source, &snapshot).await {
            Ok(insights) => Some(insights),
            Err(e) => {
                tracing::warn!(error = %e, "Generative insights failed, using fallback");
                None
            }
        },
        None => {
            tracing::debug!("No insight source configured, using fallback");
            None
        }
    };

    let (insights, origin) = match generated {
        Some(insights) => (insights, InsightOrigin::Generated),
        None => (fallback_insights(&snapshot), InsightOrigin::Fallback),
    };

    InsightReport {
        snapshot,
        insights,
        origin,
        generated_at: Utc::now(),
    }
}

/// Builds the caller's snapshot for the period containing `today`.
pub async fn snapshot_for(
    db: &DatabaseConnection,
    user_id: &str,
    today: NaiveDate,
) -> Result<FinancialSnapshot> {
    let summary = get_budget_summary_on(db, user_id, today).await?;
    let start = today
        .checked_sub_days(Days::new(u64::from(TRAILING_DAYS - 1)))
        .unwrap_or(today);
    let trailing = get_expenses(db, user_id, Some(start), Some(today)).await?;
    Ok(build_snapshot(&summary, &trailing))
}

/// Generates insights for a premium caller.
///
/// Non-premium callers get [`Error::PremiumRequired`] and nothing is computed.
pub async fn generate_for_user<S: InsightSource>(
    db: &DatabaseConnection,
    user_id: &str,
    source: Option<&S>,
    today: NaiveDate,
) -> Result<InsightReport> {
    let profile = require_premium(db, user_id).await?;
    let snapshot = snapshot_for(db, &profile.user_id, today).await?;
    Ok(generate_insights(snapshot, source).await)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::budget::{BudgetPeriod, set_budget};
    use crate::test_utils::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that returns a canned reply and counts calls.
    struct CannedSource {
        reply: Result<String>,
        calls: AtomicUsize,
    }

    impl CannedSource {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(Error::ExternalService {
                    message: "timed out".to_string(),
                }),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl InsightSource for CannedSource {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(e) => Err(Error::ExternalService {
                    message: e.to_string(),
                }),
            }
        }
    }

    const VALID_REPLY: &str = r#"Here are your insights:
```json
[
  {"icon": "warning", "title": "Slow Down", "description": "You are spending fast.", "type": "warning"},
  {"icon": "target", "title": "Budget Check", "description": "Half used.", "type": "info"},
  {"icon": "lightbulb", "title": "Cook More", "description": "Food is your top category.", "type": "tip"},
  {"icon": "piggy-bank", "title": "Save Surplus", "description": "Move extra to savings.", "type": "success"}
]
```"#;

    fn snapshot(budget: f64, spent: f64, avg: f64, top: Option<&str>) -> FinancialSnapshot {
        let (_, pct) = crate::core::budget::compute_summary(budget, spent);
        let left = budget - spent;
        #[allow(clippy::cast_possible_truncation)]
        let days = if avg <= 0.0 || left <= 0.0 {
            0
        } else {
            (left / avg).floor() as i64
        };
        FinancialSnapshot {
            budget_amount: budget,
            total_spent: spent,
            percent_used: pct,
            daily_average: avg,
            days_until_exhausted: days,
            top_category: top.map(str::to_string),
            risk: RiskLevel::from_percent(pct),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_risk_boundaries() {
        assert_eq!(RiskLevel::from_percent(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_percent(39.9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_percent(40.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_percent(75.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_percent(76.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_percent(100.0), RiskLevel::High);
    }

    #[test]
    fn test_build_snapshot() {
        let today = date(2025, 3, 18);
        let summary = BudgetSummary {
            budget: Some(crate::entities::budget::Model {
                id: 1,
                user_id: "user1".to_string(),
                amount: 3000.0,
                period: "monthly".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }),
            period_start: date(2025, 3, 1),
            period_end: date(2025, 3, 31),
            total_spent: 1500.0,
            remaining: 1500.0,
            percentage_used: 50.0,
        };
        let trailing = vec![
            test_expense_model("Food", 600.0, today),
            test_expense_model("Rent", 600.0, today),
            test_expense_model("Transport", 300.0, today),
        ];

        let snap = build_snapshot(&summary, &trailing);
        assert_eq!(snap.daily_average, 50.0);
        assert_eq!(snap.days_until_exhausted, 30);
        // Food and Rent tie; alphabetical order wins
        assert_eq!(snap.top_category.as_deref(), Some("Food"));
        assert_eq!(snap.risk, RiskLevel::Moderate);
    }

    #[test]
    fn test_days_until_exhausted_zero_cases() {
        assert_eq!(snapshot(1000.0, 200.0, 0.0, None).days_until_exhausted, 0);
        assert_eq!(snapshot(1000.0, 1200.0, 40.0, None).days_until_exhausted, 0);
        assert_eq!(snapshot(1000.0, 200.0, 30.0, None).days_until_exhausted, 26);
    }

    #[test]
    fn test_fallback_is_deterministic_and_valid() {
        let cases = [
            snapshot(0.0, 0.0, 0.0, None),
            snapshot(1000.0, 100.0, 5.0, Some("Food")),
            snapshot(1000.0, 500.0, 20.0, Some("Bills")),
            snapshot(1000.0, 760.0, 60.0, Some("Food")),
            snapshot(1000.0, 1500.0, 50.0, Some("Rent")),
            snapshot(0.0, 300.0, 10.0, Some("Food")),
        ];
        for snap in &cases {
            let first = fallback_insights(snap);
            let second = fallback_insights(snap);
            assert_eq!(first, second);
            assert_eq!(first.len(), INSIGHT_COUNT);
            validate_insights(&first).unwrap();
        }
    }

    #[test]
    fn test_fallback_high_risk_content() {
        let snap = snapshot(1000.0, 800.0, 50.0, Some("Food"));
        let insights = fallback_insights(&snap);

        assert_eq!(insights[0].title, "Budget Nearly Exhausted");
        assert_eq!(
            insights[0].description,
            "You've used 80% of your budget. Pause non-essential spending until the period resets."
        );
        assert_eq!(insights[1].title, "Budget Running Low");
        assert_eq!(
            insights[1].description,
            "At 50.00 per day, your budget lasts about 4 more days."
        );
        assert_eq!(insights[2].kind, InsightKind::Tip);
        assert!(insights[2].description.starts_with("Food "));
        assert_eq!(insights[3].title, "Try A Spending Freeze");
    }

    #[test]
    fn test_fallback_low_risk_content() {
        let snap = snapshot(3000.0, 300.0, 10.0, None);
        let insights = fallback_insights(&snap);

        assert_eq!(insights[0].kind, InsightKind::Success);
        assert_eq!(insights[1].title, "Comfortable Runway");
        assert_eq!(insights[2].title, "Start Logging Expenses");
        assert_eq!(insights[3].title, "Save The Surplus");
    }

    #[test]
    fn test_sample_insights_are_valid() {
        validate_insights(&sample_insights()).unwrap();
    }

    #[test]
    fn test_parse_tolerates_surrounding_text() {
        let insights = parse_insights(VALID_REPLY).unwrap();
        assert_eq!(insights.len(), 4);
        assert_eq!(insights[3].icon, InsightIcon::PiggyBank);
        assert_eq!(insights[0].kind, InsightKind::Warning);
    }

    #[test]
    fn test_parse_rejects_bad_replies() {
        assert!(parse_insights("no json here").is_err());
        assert!(parse_insights("] backwards [").is_err());
        // Three items
        let three = r#"[
          {"icon": "warning", "title": "A", "description": "x", "type": "warning"},
          {"icon": "target", "title": "B", "description": "x", "type": "info"},
          {"icon": "lightbulb", "title": "C", "description": "x", "type": "tip"}
        ]"#;
        assert!(parse_insights(three).is_err());
        // Unknown icon
        let unknown = VALID_REPLY.replace("\"piggy-bank\"", "\"rocket\"");
        assert!(parse_insights(&unknown).is_err());
        // Title too long
        let long = VALID_REPLY.replace("Slow Down", "Please Slow Down Your Spending Now");
        assert!(parse_insights(&long).is_err());
        // Empty description
        let empty = VALID_REPLY.replace("Half used.", " ");
        assert!(parse_insights(&empty).is_err());
    }

    #[test]
    fn test_insight_serializes_kind_as_type() {
        let value = serde_json::to_value(&sample_insights()[0]).unwrap();
        assert_eq!(value["type"], "info");
        assert_eq!(value["icon"], "target");
    }

    #[test]
    fn test_prompt_embeds_snapshot() {
        let prompt = build_prompt(&snapshot(1000.0, 800.0, 50.0, Some("Food")));
        assert!(prompt.contains("Budget: 1000.00"));
        assert!(prompt.contains("Top spending category: Food"));
        assert!(prompt.contains("Risk level: high"));
        assert!(prompt.contains("exactly 4"));
    }

    #[tokio::test]
    async fn test_generate_uses_source_when_valid() {
        let source = CannedSource::ok(VALID_REPLY);
        let report = generate_insights(snapshot(1000.0, 500.0, 20.0, None), Some(&source)).await;

        assert_eq!(report.origin, InsightOrigin::Generated);
        assert_eq!(report.insights[0].title, "Slow Down");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_falls_back_on_failure_or_garbage() {
        let snap = snapshot(1000.0, 500.0, 20.0, Some("Food"));
        let expected = fallback_insights(&snap);

        let failing = CannedSource::failing();
        let report = generate_insights(snap.clone(), Some(&failing)).await;
        assert_eq!(report.origin, InsightOrigin::Fallback);
        assert_eq!(report.insights, expected);
        // No retry
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);

        let garbage = CannedSource::ok("I cannot help with that.");
        let report = generate_insights(snap.clone(), Some(&garbage)).await;
        assert_eq!(report.insights, expected);

        let report = generate_insights(snap, None::<&CannedSource>).await;
        assert_eq!(report.origin, InsightOrigin::Fallback);
        assert_eq!(report.insights, expected);
    }

    #[tokio::test]
    async fn test_generate_for_user_requires_premium() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_profile(&db, "user1").await?;
        let source = CannedSource::ok(VALID_REPLY);

        let result = generate_for_user(&db, "user1", Some(&source), date(2025, 3, 18)).await;
        assert!(matches!(result.unwrap_err(), Error::PremiumRequired));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_for_premium_user() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_premium_profile(&db, "user1").await?;
        let today = date(2025, 3, 18);

        set_budget(&db, "user1", 1000.0, BudgetPeriod::Monthly).await?;
        create_custom_expense(&db, "user1", 450.0, "Food", date(2025, 3, 10)).await?;
        create_custom_expense(&db, "user1", 150.0, "Bills", date(2025, 2, 20)).await?;
        // Outside the trailing window
        create_custom_expense(&db, "user1", 900.0, "Rent", date(2025, 1, 1)).await?;

        let report = generate_for_user(&db, "user1", None::<&CannedSource>, today).await?;
        assert_eq!(report.snapshot.total_spent, 450.0);
        assert_eq!(report.snapshot.percent_used, 45.0);
        assert_eq!(report.snapshot.daily_average, 20.0);
        assert_eq!(report.snapshot.days_until_exhausted, 27);
        assert_eq!(report.snapshot.top_category.as_deref(), Some("Food"));
        assert_eq!(report.snapshot.risk, RiskLevel::Moderate);
        assert_eq!(report.origin, InsightOrigin::Fallback);

        Ok(())
    }
}
