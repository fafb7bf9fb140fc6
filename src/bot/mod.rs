//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the BudgetBuddy application,
//! including all slash commands, autocomplete handlers, and bot context management.
//! The caller's Discord user ID is the identity passed to every core service.

/// Per-user insight report cache
pub mod cache;
/// Discord command implementations (budget, expense, premium, insights, general)
pub mod commands;
/// Reply formatting helpers
pub mod format;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::settings::AppConfig,
    core::{llm::ChatCompletionClient, profile, upload::LocalArtifactStore},
    entities::profile::Model as ProfileModel,
    errors::{Error, Result},
};
use cache::InsightCache;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::collections::HashSet;
use tracing::{error, info, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection and any other global state
/// that commands need to access.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Application settings
    pub config: AppConfig,
    /// Discord user IDs that hold the reviewer role
    pub admin_ids: HashSet<String>,
    /// Generative insight source; `None` means fallback insights only
    pub insight_client: Option<ChatCompletionClient>,
    /// Where payment proofs are stored
    pub proof_store: LocalArtifactStore,
    /// Recently generated insight reports
    pub insight_cache: InsightCache,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        config: AppConfig,
        admin_ids: HashSet<String>,
        insight_client: Option<ChatCompletionClient>,
    ) -> Self {
        let proof_store =
            LocalArtifactStore::new(&config.uploads.directory, &config.uploads.public_base_url);
        Self {
            database,
            config,
            admin_ids,
            insight_client,
            proof_store,
            insight_cache: InsightCache::default(),
        }
    }

    /// Currency code used in replies.
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.config.premium.currency
    }
}

/// Gets or creates the invoking user's profile, refreshing name and role.
pub async fn ensure_caller(ctx: poise::Context<'_, BotData, Error>) -> Result<ProfileModel> {
    let author = ctx.author();
    let user_id = author.id.to_string();
    let display_name = author.global_name.as_deref().unwrap_or(&author.name);
    let data = ctx.data();

    profile::ensure_profile(
        &data.database,
        &user_id,
        display_name,
        data.admin_ids.contains(&user_id),
    )
    .await
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command = &ctx.command().name;
            match error.kind() {
                crate::errors::ErrorKind::Validation | crate::errors::ErrorKind::Auth => {
                    warn!(command = %command, error = %error, "Command rejected");
                }
                _ => error!(command = %command, error = ?error, "Command failed"),
            }
            let reply = poise::CreateReply::default()
                .content(format!("❌ {}", error.user_message()))
                .ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Connects to Discord and serves commands until the client stops.
pub async fn run_bot(token: &str, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::budget(),
                commands::expense(),
                commands::premium(),
                commands::insights(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Starting bot client...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e}"))?;

    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
