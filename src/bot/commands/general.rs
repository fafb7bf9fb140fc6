//! General Discord commands - ping and help.
//! This module contains simple commands that don't require database operations.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**BudgetBuddy Help**\n\
        Track your spending against a weekly or monthly budget.\n\n\
        **Budget**\n\
        • `/budget set <amount> <period>` - Sets your weekly or monthly budget.\n\
        • `/budget show` - Shows spending, remaining budget and usage for this period.\n\n\
        **Expenses**\n\
        • `/expense add <amount> <category> [description] [date]` - Logs an expense.\n\
        • `/expense list [limit] [from] [to]` - Lists your expenses, newest first.\n\
        • `/expense delete <id>` - Deletes one of your expenses.\n\
        • `/expense categories` - Spending by category this month.\n\
        • `/expense daily [days]` - Daily spending for the last 7, 14 or 30 days.\n\n\
        **Premium**\n\
        • `/premium submit <proof>` - Requests lifetime premium with a payment proof.\n\
        • `/premium status` - Shows your premium status and latest request.\n\
        • `/insights [refresh]` - Personalized spending insights (premium).\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
