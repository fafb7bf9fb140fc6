//! Budget Discord commands - set and show the caller's budget.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, ensure_caller, format},
        core::{budget, insight::RiskLevel},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum PeriodChoice {
        #[name = "weekly"]
        Weekly,
        #[name = "monthly"]
        Monthly,
    }

    impl From<PeriodChoice> for budget::BudgetPeriod {
        fn from(choice: PeriodChoice) -> Self {
            match choice {
                PeriodChoice::Weekly => Self::Weekly,
                PeriodChoice::Monthly => Self::Monthly,
            }
        }
    }

    /// Parent command for managing your budget.
    #[poise::command(slash_command, subcommands("budget_set", "budget_show"))]
    pub async fn budget(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Budget command. Available subcommands:\n\
            `/budget set` - Set your weekly or monthly budget\n\
            `/budget show` - Show this period's spending";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Sets your budget, replacing any previous one.
    #[poise::command(slash_command, rename = "set")]
    pub async fn budget_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Budget amount (e.g., 15000)"] amount: f64,
        #[description = "Budget period. Defaults to monthly."] period: Option<PeriodChoice>,
    ) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        let data = ctx.data();
        let period = period.map_or(budget::BudgetPeriod::Monthly, Into::into);

        let saved = budget::set_budget(&data.database, &caller.user_id, amount, period).await?;

        ctx.say(format!(
            "✅ Your {} budget is now **{}**.",
            saved.period,
            format::format_amount(saved.amount, data.currency())
        ))
        .await?;
        Ok(())
    }

    /// Shows spending, remaining budget and usage for the current period.
    #[poise::command(slash_command, rename = "show")]
    pub async fn budget_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        let data = ctx.data();
        let currency = data.currency();

        let summary = budget::get_budget_summary(&data.database, &caller.user_id).await?;
        let period_text = format!(
            "{} to {}",
            summary.period_start.format("%Y-%m-%d"),
            summary.period_end.format("%Y-%m-%d")
        );

        let embed = if let Some(active) = &summary.budget {
            let risk = RiskLevel::from_percent(summary.percentage_used);
            serenity::CreateEmbed::default()
                .title(format!("💰 Your {} budget", active.period))
                .description(period_text)
                .color(0x0034_98DB)
                .field("Budget", format::format_amount(active.amount, currency), true)
                .field("Spent", format::format_amount(summary.total_spent, currency), true)
                .field(
                    "Remaining",
                    format::format_amount(summary.remaining, currency),
                    true,
                )
                .field(
                    "Usage",
                    format!(
                        "{} {}",
                        format::format_progress_bar(summary.percentage_used, Some(10)),
                        format::risk_emoji(risk)
                    ),
                    false,
                )
        } else {
            serenity::CreateEmbed::default()
                .title("💰 No budget set")
                .description(format!(
                    "You've spent **{}** this month ({period_text}).\nUse `/budget set` to start tracking.",
                    format::format_amount(summary.total_spent, currency)
                ))
                .color(0x0095_A5A6)
        };

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
