use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use serenity::prelude::*;
use std::sync::Arc;

use courier::commands::{create_action_catalog, HandlerContext};
use courier::core::Config;
use courier::database::Database;
use courier::dispatch::{Dispatcher, EventBus, EventRouter};
use courier::errors::MessageTable;
use courier::events::create_event_catalog;
use courier::gateway::{GatewayHandler, SerenityPublisher};
use courier::loader::{FolderLoader, LoadFailure};
use courier::registry::{ActionRegistry, EventRegistry};

fn summarize(noun: &str, failures: &[LoadFailure]) {
    if failures.is_empty() {
        return;
    }
    warn!("⚠️ {} {noun} manifest(s) failed to load:", failures.len());
    for failure in failures {
        warn!("   - {}: {}", failure.path.display(), failure.error);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting courier...");

    let database = Database::new(&config.database_path).await?;
    let actions = Arc::new(ActionRegistry::new());
    let events = Arc::new(EventRegistry::new());
    let context = Arc::new(HandlerContext::new(database, actions.clone(), events.clone()));

    let mut messages = MessageTable::builtin();
    match messages.merge_file(&config.messages_path) {
        Ok(0) => debug!("No message overrides at {}", config.messages_path.display()),
        Ok(count) => info!(
            "🌍 Loaded {count} message override(s) from {}",
            config.messages_path.display()
        ),
        Err(e) => warn!(
            "Ignoring message overrides at {}: {e:#}",
            config.messages_path.display()
        ),
    }

    let dispatcher = Arc::new(Dispatcher::new(context.clone(), Arc::new(messages)));
    let publisher = Arc::new(SerenityPublisher::new(config.discord_guild_id));
    if let Some(guild_id) = config.discord_guild_id {
        info!("🔧 Development mode: commands publish to guild {guild_id} only");
    }

    let action_loader = FolderLoader::new(actions.clone(), Arc::new(create_action_catalog()));
    let failures = action_loader
        .load_folder(&config.actions_dir, true, config.force_register)
        .await?;
    summarize("action", &failures);

    let event_catalog = create_event_catalog(dispatcher.clone(), publisher.clone());
    let event_loader = FolderLoader::new(events.clone(), Arc::new(event_catalog));
    let failures = event_loader
        .load_folder(&config.events_dir, true, config.force_register)
        .await?;
    summarize("event", &failures);

    info!(
        "📦 Registered {} action(s) and {} event handler(s)",
        actions.len(),
        events.len()
    );

    let bus = Arc::new(EventBus::new(context.clone()));
    let router = EventRouter::new(events.clone(), bus.clone());
    router.listen_all();

    let handler = GatewayHandler::new(bus, publisher);

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Establishing WebSocket connection to Discord gateway...");

    let started = match config.shard {
        Some(shard) => {
            info!("⚡ Running shard {}/{}", shard.id + 1, shard.count);
            client.start_shard(shard.id, shard.count).await
        }
        None => client.start().await,
    };

    if let Err(why) = started {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
