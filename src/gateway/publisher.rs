//! Command publication over serenity's HTTP client

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::info;
use serenity::builder::CreateApplicationCommand;
use serenity::http::Http;
use serenity::model::application::command::Command;
use serenity::model::id::GuildId;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::commands::publish::CommandPublisher;

/// Replaces the global command set, or one guild's in development mode
///
/// The HTTP client only exists once the gateway client is built, so it is
/// attached after construction.
pub struct SerenityPublisher {
    http: RwLock<Option<Arc<Http>>>,
    guild_id: Option<u64>,
}

impl SerenityPublisher {
    pub fn new(guild_id: Option<u64>) -> Self {
        Self {
            http: RwLock::new(None),
            guild_id,
        }
    }

    pub async fn attach(&self, http: Arc<Http>) {
        *self.http.write().await = Some(http);
    }

    pub fn guild_id(&self) -> Option<u64> {
        self.guild_id
    }
}

#[async_trait]
impl CommandPublisher for SerenityPublisher {
    async fn set_commands(&self, commands: Vec<CreateApplicationCommand>) -> Result<()> {
        let http = self
            .http
            .read()
            .await
            .clone()
            .context("no HTTP client attached; commands cannot be published yet")?;

        match self.guild_id {
            Some(guild_id) => {
                GuildId(guild_id)
                    .set_application_commands(&http, |set| {
                        for command in commands {
                            set.add_application_command(command);
                        }
                        set
                    })
                    .await
                    .with_context(|| format!("publishing commands to guild {guild_id}"))?;
                info!("🔧 Guild commands replaced for guild {guild_id}");
            }
            None => {
                Command::set_global_application_commands(&http, |set| {
                    for command in commands {
                        set.add_application_command(command);
                    }
                    set
                })
                .await
                .context("publishing global commands")?;
                info!("🌐 Global commands replaced");
            }
        }
        Ok(())
    }
}
