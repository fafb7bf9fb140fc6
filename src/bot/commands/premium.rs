//! Premium Discord commands - upgrade requests and their review.
//!
//! Review subcommands are open to everyone in Discord's command list; the
//! reviewer role is checked by the core service on every call.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, ensure_caller, format},
        core::{
            premium,
            upload::{self, ProofArtifact},
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Parent command for lifetime premium.
    #[poise::command(
        slash_command,
        subcommands(
            "premium_submit",
            "premium_status",
            "premium_pending",
            "premium_approve",
            "premium_reject",
            "premium_revoke",
            "premium_reconcile"
        )
    )]
    pub async fn premium(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let pricing = &ctx.data().config.premium;
        ctx.say(format!(
            "⭐ Lifetime premium costs **{}** once.\n\
            `/premium submit` - Send your payment proof\n\
            `/premium status` - Check your request",
            format::format_amount(pricing.price, &pricing.currency)
        ))
        .await?;
        Ok(())
    }

    /// Requests lifetime premium with a screenshot or PDF of your payment.
    #[poise::command(slash_command, rename = "submit")]
    pub async fn premium_submit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Payment proof (screenshot or PDF)"] proof: serenity::Attachment,
    ) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        if caller.is_premium {
            ctx.say("⭐ You already have lifetime premium.").await?;
            return Ok(());
        }

        upload::check_proof_attachment(proof.content_type.as_deref(), u64::from(proof.size))?;

        ctx.defer_ephemeral().await?;

        let data = ctx.data();
        let bytes = proof.download().await.map_err(|e| Error::Upload {
            message: format!("could not download attachment: {e}"),
        })?;
        let artifact = ProofArtifact {
            file_name: proof.filename.clone(),
            bytes,
        };

        let request = premium::submit_request(
            &data.database,
            &data.proof_store,
            &data.config.premium,
            &caller.user_id,
            Some(artifact),
        )
        .await?;

        ctx.send(
            poise::CreateReply::default()
                .content(format!(
                    "✅ Request `#{}` submitted for **{}**. A reviewer will check your payment soon.",
                    request.id,
                    format::format_amount(request.amount_paid, data.currency())
                ))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Shows your premium status and latest request.
    #[poise::command(slash_command, rename = "status")]
    pub async fn premium_status(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        let data = ctx.data();

        let mut message = if caller.is_premium {
            let since = caller
                .premium_since
                .map_or_else(String::new, |t| format!(" since {}", t.format("%Y-%m-%d")));
            format!("⭐ You have **{}** premium{since}.", caller.premium_tier)
        } else {
            "You are on the **free** tier.".to_string()
        };

        if let Some(request) = premium::latest_request(&data.database, &caller.user_id).await? {
            write!(
                &mut message,
                "\nLatest request `#{}`: **{}** (submitted {})",
                request.id,
                request.status,
                request.created_at.format("%Y-%m-%d")
            )?;
        }

        ctx.send(
            poise::CreateReply::default()
                .content(message)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Lists pending premium requests (reviewers only).
    #[poise::command(slash_command, rename = "pending")]
    pub async fn premium_pending(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        let data = ctx.data();

        let pending = premium::list_pending(&data.database, &caller.user_id).await?;
        if pending.is_empty() {
            ctx.send(
                poise::CreateReply::default()
                    .content("📭 No pending requests.")
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }

        let fields = pending.iter().take(format::EMBED_FIELD_LIMIT).map(|p| {
            let name = p.requester_name.as_deref().unwrap_or("unknown");
            (
                format!("#{} · {name}", p.request.id),
                format!(
                    "<@{}> · {} · {}\n[payment proof]({})",
                    p.request.user_id,
                    format::format_amount(p.request.amount_paid, data.currency()),
                    p.request.created_at.format("%Y-%m-%d %H:%M"),
                    p.request.payment_proof_url
                ),
                false,
            )
        });

        let embed = serenity::CreateEmbed::default()
            .title(format!("🕒 Pending premium requests ({})", pending.len()))
            .color(0x00F1_C40F)
            .fields(fields);

        ctx.send(
            poise::CreateReply::default()
                .embed(embed)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Approves a request and grants lifetime premium (reviewers only).
    #[poise::command(slash_command, rename = "approve")]
    pub async fn premium_approve(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Request ID"] request_id: i64,
    ) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        let data = ctx.data();

        let request = premium::approve_request(&data.database, &caller.user_id, request_id).await?;
        data.insight_cache.invalidate(&request.user_id).await;

        ctx.say(format!(
            "✅ Request `#{}` approved. <@{}> now has lifetime premium.",
            request.id, request.user_id
        ))
        .await?;
        Ok(())
    }

    /// Rejects a request (reviewers only).
    #[poise::command(slash_command, rename = "reject")]
    pub async fn premium_reject(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Request ID"] request_id: i64,
    ) -> Result<()> {
        let caller = ensure_caller(ctx).await?;

        let request =
            premium::reject_request(&ctx.data().database, &caller.user_id, request_id).await?;

        ctx.say(format!("🚫 Request `#{}` rejected.", request.id))
            .await?;
        Ok(())
    }

    /// Moves a user back to the free tier (reviewers only).
    #[poise::command(slash_command, rename = "revoke")]
    pub async fn premium_revoke(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to downgrade"] user: serenity::User,
    ) -> Result<()> {
        let caller = ensure_caller(ctx).await?;
        let data = ctx.data();
        let user_id = user.id.to_string();

        premium::revoke_premium(&data.database, &caller.user_id, &user_id).await?;
        data.insight_cache.invalidate(&user_id).await;

        ctx.say(format!("↩️ <@{user_id}> is back on the free tier."))
            .await?;
        Ok(())
    }

    /// Upgrades users whose approved request never took effect (reviewers only).
    #[poise::command(slash_command, rename = "reconcile")]
    pub async fn premium_reconcile(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let caller = ensure_caller(ctx).await?;

        let repaired = premium::reconcile_approved(&ctx.data().database, &caller.user_id).await?;

        ctx.send(
            poise::CreateReply::default()
                .content(format!(
                    "🔧 Reconciled {repaired} profile{}.",
                    if repaired == 1 { "" } else { "s" }
                ))
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
