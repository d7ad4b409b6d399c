//! Gateway lifecycle handlers
//!
//! Handles: ready, cacheReady, resume, guildCreate, guildDelete
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

use crate::commands::context::HandlerContext;
use crate::commands::publish::{publish_commands, CommandPublisher};
use crate::registry::{EventCallback, EventPayload};

/// Logs the session and publishes the Action Registry's commands
///
/// Publication is a full replace of one shared command set, so only the
/// first shard (or an unsharded client) performs it.
pub struct ReadyHandler {
    publisher: Arc<dyn CommandPublisher>,
}

impl ReadyHandler {
    pub fn new(publisher: Arc<dyn CommandPublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl EventCallback for ReadyHandler {
    async fn run(&self, ctx: Arc<HandlerContext>, payload: &EventPayload) -> Result<()> {
        let EventPayload::Ready {
            user_id,
            user_name,
            guild_count,
            shard,
        } = payload
        else {
            return ignore(payload);
        };

        info!("🎉 {user_name} is connected and ready!");
        info!("📡 Connected to {guild_count} guilds");
        info!("🤖 Bot ID: {user_id}");
        if let Some([id, count]) = shard {
            info!("⚡ Shard: {}/{}", id + 1, count);
        }
        info!(
            "📦 {} actions, {} events registered",
            ctx.actions.len(),
            ctx.events.len()
        );

        if matches!(shard, Some([id, _]) if *id != 0) {
            debug!("Commands are published by shard 0");
            return Ok(());
        }
        publish_commands(&ctx.actions, self.publisher.as_ref()).await?;
        Ok(())
    }
}

pub struct CacheReadyHandler;

#[async_trait]
impl EventCallback for CacheReadyHandler {
    async fn run(&self, _ctx: Arc<HandlerContext>, payload: &EventPayload) -> Result<()> {
        if let EventPayload::CacheReady { guild_count } = payload {
            info!("📦 Cache ready with {guild_count} guilds fully loaded");
            return Ok(());
        }
        ignore(payload)
    }
}

pub struct ResumeHandler;

#[async_trait]
impl EventCallback for ResumeHandler {
    async fn run(&self, _ctx: Arc<HandlerContext>, payload: &EventPayload) -> Result<()> {
        if let EventPayload::Resume = payload {
            info!("🔄 Gateway session resumed");
            return Ok(());
        }
        ignore(payload)
    }
}

pub struct GuildJoinHandler;

#[async_trait]
impl EventCallback for GuildJoinHandler {
    async fn run(&self, _ctx: Arc<HandlerContext>, payload: &EventPayload) -> Result<()> {
        let EventPayload::GuildCreate {
            guild_id,
            name,
            member_count,
            is_new,
        } = payload
        else {
            return ignore(payload);
        };

        if *is_new {
            info!("🆕 Joined new guild: {name} ({guild_id}) - {member_count} members");
        } else {
            info!("📥 Guild available: {name} ({guild_id})");
        }
        Ok(())
    }
}

pub struct GuildLeaveHandler;

#[async_trait]
impl EventCallback for GuildLeaveHandler {
    async fn run(&self, _ctx: Arc<HandlerContext>, payload: &EventPayload) -> Result<()> {
        let EventPayload::GuildDelete { guild_id, name } = payload else {
            return ignore(payload);
        };

        match name {
            Some(name) => info!("👋 Removed from guild: {name} ({guild_id})"),
            None => info!("👋 Removed from guild {guild_id}"),
        }
        Ok(())
    }
}

/// A manifest subscribed a handler to an event it does not understand
fn ignore(payload: &EventPayload) -> Result<()> {
    debug!("Ignoring {} payload", payload.kind());
    Ok(())
}
