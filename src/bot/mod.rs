//! Bot layer - Discord-specific interface and command handlers
//!
//! This module owns the connection lifecycle and dispatches incoming prefix
//! commands and component interactions to the broadcast workflow.

/// Discord command implementations (broadcast, server listing)
pub mod commands;

use crate::config::AppConfig;
use crate::errors;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
///
/// Initialized once at startup and read-only from the workflow's
/// perspective; commands reach it through their invocation context rather
/// than a global.
#[derive(Debug)]
pub struct Data {
    /// Immutable process configuration
    pub app_config: Arc<AppConfig>,
}

// Type aliases Poise will use
pub(crate) type Error = errors::Error;
pub(crate) type Context<'a> = poise::Context<'a, Data, Error>;

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            panic!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::MissingUserPermissions { ctx, .. } => {
            if let Err(e) = ctx
                .say("You do not have permission to use this command.")
                .await
            {
                error!("Failed to send permission notice: {e}");
            }
        }
        // Unrecognized commands produce no output.
        poise::FrameworkError::UnknownCommand { .. } => {}
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx
                .say("Something went wrong while running that command.")
                .await
            {
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

/// Runs the bot until the connection is externally stopped.
///
/// Fatal setup errors (including invalid credentials) are logged and
/// returned; everything after login is handled locally by [`on_error`] and
/// never crashes the connection.
#[instrument(skip(token, app_config))]
pub async fn run_bot(token: String, app_config: Arc<AppConfig>) -> Result<(), serenity::Error> {
    let prefix = app_config.prefix.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::mpall(), commands::serveurs()],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix.clone()),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Present in {} servers", ctx.cache.guilds().len());
                ctx.set_activity(Some(serenity::ActivityData::watching(format!(
                    "{prefix}mpall help"
                ))));
                Ok(Data { app_config })
            })
        })
        .build();

    // GUILD_MEMBERS is a privileged intent; it must be enabled on the
    // developer portal for member lists to resolve.
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await;

    match client {
        Ok(mut c) => {
            info!("Starting bot client...");
            if let Err(why) = c.start().await {
                if matches!(
                    why,
                    serenity::Error::Gateway(serenity::GatewayError::InvalidAuthentication)
                ) {
                    error!(
                        "Invalid Discord token. Check DISCORD_TOKEN or the `token` \
                         entry in the config file."
                    );
                } else {
                    error!("Client error: {why:?}");
                }
                return Err(why);
            }
        }
        Err(e) => {
            error!("Error creating client: {e:?}");
            return Err(e);
        }
    }
    Ok(())
}
