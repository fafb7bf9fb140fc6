//! Text formatting for Discord replies - progress bars, amounts and small charts.

use crate::{
    core::{
        expense::DailyTotal,
        insight::{InsightIcon, InsightKind, RiskLevel},
    },
    entities::expense,
    errors::{Error, Result},
};
use chrono::NaiveDate;

/// Discord's limit on an embed description, in characters.
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Discord's limit on fields per embed.
pub const EMBED_FIELD_LIMIT: usize = 25;

// Room kept for the "…and N more" note
const MORE_NOTE_RESERVE: usize = 32;

/// Formats a percentage as a text progress bar, e.g. `[█████░░░░░] 50.0%`.
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // Cast safety: clamped_progress ∈ [0, 100] and length is small
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {progress_percent:.1}%",
        "█".repeat(filled),
        "░".repeat(empty)
    )
}

/// Formats an amount with its currency code, e.g. `INR 1,250.50`.
#[must_use]
pub fn format_amount(amount: f64, currency: &str) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}{currency} {grouped}.{cents}")
}

/// Parses a `YYYY-MM-DD` command argument.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("'{raw}' is not a date, use YYYY-MM-DD")))
}

/// One line of an expense listing.
#[must_use]
pub fn format_expense_line(expense: &expense::Model, currency: &str) -> String {
    let mut line = format!(
        "`#{}` {} · **{}** · {}",
        expense.id,
        expense.date.format("%Y-%m-%d"),
        expense.category,
        format_amount(expense.amount, currency)
    );
    if let Some(description) = &expense.description {
        line.push_str(" · ");
        line.push_str(description);
    }
    line
}

/// Joins `lines` with newlines without exceeding `limit` characters.
///
/// Lines that do not fit are dropped from the end and replaced by a
/// `…and N more` note.
#[must_use]
pub fn join_lines_within(lines: &[String], limit: usize) -> String {
    let mut joined = String::new();
    let mut used = 0;

    for (i, line) in lines.iter().enumerate() {
        let cost = usize::from(i > 0) + line.chars().count();
        let reserve = if i + 1 == lines.len() { 0 } else { MORE_NOTE_RESERVE };
        if used + cost + reserve > limit {
            let note = format!("…and {} more", lines.len() - i);
            if !joined.is_empty() {
                joined.push('\n');
            }
            joined.push_str(&note);
            return joined;
        }
        if i > 0 {
            joined.push('\n');
        }
        joined.push_str(line);
        used += cost;
    }
    joined
}

/// Renders a daily series as one bar per day, scaled to the largest day.
#[must_use]
pub fn format_daily_chart(series: &[DailyTotal], currency: &str) -> String {
    const WIDTH: f64 = 12.0;
    let max = series.iter().map(|d| d.total).fold(0.0_f64, f64::max);

    series
        .iter()
        .map(|day| {
            // Cast safety: ratio ∈ [0, 1], so the product is in [0, WIDTH]
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let filled = if max > 0.0 {
                (day.total / max * WIDTH).round() as usize
            } else {
                0
            };
            format!(
                "{} {:<12} {}",
                day.date.format("%m-%d"),
                "▇".repeat(filled),
                format_amount(day.total, currency)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emoji for an insight icon.
#[must_use]
pub const fn icon_emoji(icon: InsightIcon) -> &'static str {
    match icon {
        InsightIcon::Warning => "⚠️",
        InsightIcon::TrendingUp => "📈",
        InsightIcon::TrendingDown => "📉",
        InsightIcon::Target => "🎯",
        InsightIcon::Lightbulb => "💡",
        InsightIcon::PiggyBank => "🐷",
    }
}

/// Embed accent color for an insight kind.
#[must_use]
pub const fn kind_color(kind: InsightKind) -> u32 {
    match kind {
        InsightKind::Warning => 0x00E7_4C3C,
        InsightKind::Tip => 0x00F1_C40F,
        InsightKind::Success => 0x002E_CC71,
        InsightKind::Info => 0x0034_98DB,
    }
}

/// Status emoji for a risk tier.
#[must_use]
pub const fn risk_emoji(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Low => "🟢",
        RiskLevel::Moderate => "🟡",
        RiskLevel::High => "🔴",
    }
}
