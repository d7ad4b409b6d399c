//! # Gateway
//!
//! The serenity boundary. Gateway events are converted into
//! [`EventPayload`]s and handed to the [`EventBus`]; nothing past this module
//! sees a serenity type except the command builders used for publication.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod convert;
pub mod publisher;
pub mod responder;

use serenity::async_trait;
use serenity::model::application::interaction::Interaction as SerenityInteraction;
use serenity::model::channel::Message;
use serenity::model::event::ResumedEvent;
use serenity::model::gateway::Ready;
use serenity::model::guild::{Guild, UnavailableGuild};
use serenity::model::id::GuildId;
use serenity::prelude::{Context, EventHandler};
use std::sync::Arc;

pub use convert::convert_interaction;
pub use publisher::SerenityPublisher;
pub use responder::SerenityResponder;

use crate::dispatch::EventBus;
use crate::registry::EventPayload;

/// Forwards serenity events to the event bus
pub struct GatewayHandler {
    bus: Arc<EventBus>,
    publisher: Arc<SerenityPublisher>,
}

impl GatewayHandler {
    pub fn new(bus: Arc<EventBus>, publisher: Arc<SerenityPublisher>) -> Self {
        Self { bus, publisher }
    }
}

#[async_trait]
impl EventHandler for GatewayHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.publisher.attach(ctx.http.clone()).await;
        self.bus
            .emit(EventPayload::Ready {
                user_id: ready.user.id.0,
                user_name: ready.user.name.clone(),
                guild_count: ready.guilds.len(),
                shard: ready.shard,
            })
            .await;
    }

    async fn cache_ready(&self, _ctx: Context, guilds: Vec<GuildId>) {
        self.bus
            .emit(EventPayload::CacheReady {
                guild_count: guilds.len(),
            })
            .await;
    }

    async fn resume(&self, _ctx: Context, _resumed: ResumedEvent) {
        self.bus.emit(EventPayload::Resume).await;
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, is_new: bool) {
        self.bus
            .emit(EventPayload::GuildCreate {
                guild_id: guild.id.0,
                name: guild.name.clone(),
                member_count: guild.member_count,
                is_new,
            })
            .await;
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, full: Option<Guild>) {
        self.bus
            .emit(EventPayload::GuildDelete {
                guild_id: incomplete.id.0,
                name: full.map(|g| g.name),
            })
            .await;
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        self.bus
            .emit(EventPayload::MessageCreate {
                message_id: msg.id.0,
                channel_id: msg.channel_id.0,
                guild_id: msg.guild_id.map(|g| g.0),
                author_id: msg.author.id.0,
                author_name: msg.author.name.clone(),
                is_bot: msg.author.bot,
                content: msg.content,
            })
            .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: SerenityInteraction) {
        let interaction = convert_interaction(interaction, ctx.http.clone());
        self.bus
            .emit(EventPayload::InteractionCreate(Box::new(interaction)))
            .await;
    }
}
