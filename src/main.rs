use dmcast::{bot, config, errors::Result};
use dotenvy::dotenv;
use std::{env, fs::OpenOptions, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt,
};

const LOG_PATH: &str = "bot.log";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    init_tracing()?;

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the configuration file; a bad or missing file is fatal
    let config_path =
        env::var("DMCAST_CONFIG").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_owned());
    let app_config = config::load_config(&config_path)
        .inspect_err(|e| error!("Failed to load configuration: {e}"))?;
    info!("Loaded configuration from {config_path}");

    // 4. Resolve the token (environment first, config file second); fatal if absent
    let token = config::resolve_token(env::var("DISCORD_TOKEN").ok(), app_config.token.as_deref())
        .inspect_err(|e| error!("{e}"))?;

    // 5. Run the bot
    bot::run_bot(token, Arc::new(app_config)).await?;

    Ok(())
}

/// Logs to stdout (env-filtered) and to an append-mode log file.
fn init_tracing() -> Result<()> {
    let log_file = OpenOptions::new().create(true).append(true).open(LOG_PATH)?;

    let stdout_layer = tracing_subscriber::fmt::layer().with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    );
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();
    Ok(())
}
