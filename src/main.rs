//! Gavel - a community assistant bot for running debate events on Discord
//!
//! This is the main entry point for the gavel application.

use std::sync::Arc;

use serenity::all::{Client, GatewayIntents, GuildId};
use tracing::{error, info};

use gavel::{
    config::{Config, GuildSettings, Secrets},
    events::Handler,
    state::AppState,
    tasks::display_refresh_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; production sets the variables directly.
    let _ = dotenvy::dotenv();

    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("gavel={}", config.log_level()))
        .init();

    info!("Starting gavel v0.1.0");

    let secrets = Secrets::from_env()?;
    let settings = GuildSettings::load(&config.settings)?;
    info!(
        "Configuration: settings={}, guild={}, {} team roles in catalog",
        config.settings,
        secrets.guild_id,
        settings.team_role_count()
    );

    // Create application state
    let state = Arc::new(AppState::new(settings, GuildId::new(secrets.guild_id)));

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_PRESENCES;

    let mut client = Client::builder(&secrets.token, intents)
        .event_handler(Handler::new(Arc::clone(&state)))
        .await?;

    // Start the shared display refresh driver; it serves every timer for the
    // process lifetime.
    tokio::spawn(display_refresh_task(
        Arc::clone(&state),
        client.http.clone(),
    ));

    // Setup graceful shutdown
    let shard_manager = client.shard_manager.clone();
    tokio::select! {
        result = client.start() => {
            if let Err(e) = result {
                error!("Client error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            shard_manager.shutdown_all().await;
        }
    }

    info!("Bot shutdown complete (uptime {})", state.uptime());
    Ok(())
}
