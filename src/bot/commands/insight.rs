//! Insight Discord commands - personalized spending insights for premium users.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, ensure_caller, format},
        core::insight::{self, Insight, InsightOrigin, InsightReport},
        errors::{Error, Result},
    };
    use chrono::{Local, Utc};
    use poise::serenity_prelude as serenity;

    fn insight_field(item: &Insight) -> (String, String, bool) {
        (
            format!("{} {}", format::icon_emoji(item.icon), item.title),
            item.description.clone(),
            false,
        )
    }

    fn report_embed(report: &InsightReport, currency: &str) -> serenity::CreateEmbed {
        let snapshot = &report.snapshot;
        let color = report
            .insights
            .first()
            .map_or(0x0034_98DB, |first| format::kind_color(first.kind));
        let source = match report.origin {
            InsightOrigin::Generated => "AI generated",
            InsightOrigin::Fallback => "Standard insights",
        };

        serenity::CreateEmbed::default()
            .title("🧠 Your spending insights")
            .description(format!(
                "{} Risk: **{}** · {} used · {} per day",
                format::risk_emoji(snapshot.risk),
                snapshot.risk.as_str(),
                format::format_progress_bar(snapshot.percent_used, Some(8)),
                format::format_amount(snapshot.daily_average, currency)
            ))
            .color(color)
            .fields(report.insights.iter().map(insight_field))
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{source} · {}",
                report.generated_at.format("%Y-%m-%d %H:%M UTC")
            )))
    }

    /// Shows four personalized insights about your spending (premium).
    ///
    /// Results are reused for 24 hours unless you ask for a refresh.
    #[poise::command(slash_command)]
    pub async fn insights(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Generate fresh insights instead of reusing today's"] refresh: Option<bool>,
    ) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        let data = ctx.data();

        if !caller.is_premium {
            let embed = serenity::CreateEmbed::default()
                .title("🔒 Insights are a premium feature")
                .description(format!(
                    "Here's a preview. Unlock your own for **{}** with `/premium submit`.",
                    format::format_amount(data.config.premium.price, data.currency())
                ))
                .color(0x0095_A5A6)
                .fields(insight::sample_insights().iter().map(insight_field));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }

        if refresh.unwrap_or(false) {
            data.insight_cache.invalidate(&caller.user_id).await;
        }

        let report = if let Some(cached) = data.insight_cache.get(&caller.user_id, Utc::now()).await
        {
            tracing::debug!(user_id = %caller.user_id, "Serving cached insights");
            cached
        } else {
            ctx.defer().await?;
            let report = insight::generate_for_user(
                &data.database,
                &caller.user_id,
                data.insight_client.as_ref(),
                Local::now().date_naive(),
            )
            .await?;
            data.insight_cache
                .put(&caller.user_id, report.clone())
                .await;
            report
        };

        ctx.send(poise::CreateReply::default().embed(report_embed(&report, data.currency())))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
