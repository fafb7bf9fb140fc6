//! Expense Discord commands - log, list and delete expenses, plus spending charts.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, ensure_caller, format, handlers::autocomplete},
        core::{budget, expense},
        errors::{Error, Result},
    };
    use chrono::Local;
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    const DEFAULT_LIST_LIMIT: u32 = 10;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum WindowChoice {
        #[name = "7 days"]
        Week,
        #[name = "14 days"]
        Fortnight,
        #[name = "30 days"]
        Month,
    }

    impl WindowChoice {
        const fn days(self) -> u32 {
            match self {
                Self::Week => 7,
                Self::Fortnight => 14,
                Self::Month => 30,
            }
        }
    }

    /// Parent command for your expense ledger.
    #[poise::command(
        slash_command,
        subcommands(
            "expense_add",
            "expense_list",
            "expense_delete",
            "expense_categories",
            "expense_daily"
        )
    )]
    pub async fn expense(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Expense command. Available subcommands:\n\
            `/expense add` - Log an expense\n\
            `/expense list` - List your expenses\n\
            `/expense delete` - Delete an expense\n\
            `/expense categories` - Spending by category this month\n\
            `/expense daily` - Daily spending chart";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Logs an expense. The date defaults to today.
    #[poise::command(slash_command, rename = "add")]
    pub async fn expense_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Amount spent (e.g., 250)"] amount: f64,
        #[description = "Category (pick one or type your own)"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category: String,
        #[description = "What it was for"] description: Option<String>,
        #[description = "Date as YYYY-MM-DD. Defaults to today."] date: Option<String>,
    ) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        let data = ctx.data();
        let currency = data.currency();

        let date = match date.as_deref() {
            Some(raw) => format::parse_date(raw)?,
            None => Local::now().date_naive(),
        };

        let saved = expense::add_expense(
            &data.database,
            &caller.user_id,
            amount,
            &category,
            description,
            date,
        )
        .await?;

        let mut message = format!(
            "✅ Logged **{}** for **{}** on {}.",
            format::format_amount(saved.amount, currency),
            saved.category,
            saved.date.format("%Y-%m-%d")
        );

        let summary = budget::get_budget_summary(&data.database, &caller.user_id).await?;
        if summary.budget.is_some() {
            write!(
                &mut message,
                "\n{} left this period {}",
                format::format_amount(summary.remaining, currency),
                format::format_progress_bar(summary.percentage_used, Some(10))
            )?;
        }

        ctx.say(message).await?;
        Ok(())
    }

    /// Lists your expenses, newest first.
    #[poise::command(slash_command, rename = "list")]
    pub async fn expense_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many to show (default 10)"]
        #[min = 1]
        #[max = 50]
        limit: Option<u32>,
        #[description = "Earliest date as YYYY-MM-DD"] from: Option<String>,
        #[description = "Latest date as YYYY-MM-DD"] to: Option<String>,
    ) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        let data = ctx.data();
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);

        let start = from.as_deref().map(format::parse_date).transpose()?;
        let end = to.as_deref().map(format::parse_date).transpose()?;

        let expenses = if start.is_none() && end.is_none() {
            expense::get_recent_expenses(&data.database, &caller.user_id, u64::from(limit)).await?
        } else {
            let mut ranged =
                expense::get_expenses(&data.database, &caller.user_id, start, end).await?;
            ranged.truncate(limit as usize);
            ranged
        };

        if expenses.is_empty() {
            ctx.say("📭 No expenses found. Log one with `/expense add`.")
                .await?;
            return Ok(());
        }

        let lines: Vec<String> = expenses
            .iter()
            .map(|e| format::format_expense_line(e, data.currency()))
            .collect();
        let total: f64 = expenses.iter().map(|e| e.amount).sum();

        let embed = serenity::CreateEmbed::default()
            .title("🧾 Your expenses")
            .description(format::join_lines_within(
                &lines,
                format::EMBED_DESCRIPTION_LIMIT,
            ))
            .color(0x0034_98DB)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} expense{} · {}",
                expenses.len(),
                if expenses.len() == 1 { "" } else { "s" },
                format::format_amount(total, data.currency())
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Deletes one of your expenses by its ID.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn expense_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Expense ID shown in /expense list"] id: i64,
    ) -> Result<()> {
        let caller = ensure_caller(ctx).await?;

        let removed = expense::delete_expense(&ctx.data().database, &caller.user_id, id).await?;
        let message = if removed {
            format!("🗑️ Deleted expense `#{id}`.")
        } else {
            format!("❌ You have no expense `#{id}`.")
        };

        ctx.send(
            poise::CreateReply::default()
                .content(message)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Shows this month's spending grouped by category.
    #[poise::command(slash_command, rename = "categories")]
    pub async fn expense_categories(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        let data = ctx.data();
        let currency = data.currency();

        let totals = expense::category_breakdown(
            &data.database,
            &caller.user_id,
            Local::now().date_naive(),
        )
        .await?;

        if totals.is_empty() {
            ctx.say("📭 No spending this month yet.").await?;
            return Ok(());
        }

        let grand_total: f64 = totals.iter().map(|t| t.total).sum();
        let fields = totals.iter().take(format::EMBED_FIELD_LIMIT).map(|t| {
            let share = t.total / grand_total * 100.0;
            (
                t.category.clone(),
                format!(
                    "{}\n{}",
                    format::format_amount(t.total, currency),
                    format::format_progress_bar(share, Some(8))
                ),
                true,
            )
        });

        let mut embed = serenity::CreateEmbed::default()
            .title("📊 Spending by category")
            .description(format!(
                "This month: **{}**",
                format::format_amount(grand_total, currency)
            ))
            .color(0x004F_46E5)
            .fields(fields);

        let hidden = totals.len().saturating_sub(format::EMBED_FIELD_LIMIT);
        if hidden > 0 {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "+{hidden} more categor{}",
                if hidden == 1 { "y" } else { "ies" }
            )));
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows daily spending for the last 7, 14 or 30 days.
    #[poise::command(slash_command, rename = "daily")]
    pub async fn expense_daily(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Window length. Defaults to 7 days."] days: Option<WindowChoice>,
    ) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        let data = ctx.data();
        let days = days.unwrap_or(WindowChoice::Week).days();

        let series = expense::daily_spending(
            &data.database,
            &caller.user_id,
            days,
            Local::now().date_naive(),
        )
        .await?;
        let total: f64 = series.iter().map(|d| d.total).sum();

        let embed = serenity::CreateEmbed::default()
            .title(format!("📅 Daily spending, last {days} days"))
            .description(format!(
                "```\n{}\n```",
                format::format_daily_chart(&series, data.currency())
            ))
            .color(0x0010_B981)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Total {}",
                format::format_amount(total, data.currency())
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
