//! Utility action handlers
//!
//! Handles: ping
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Runs as a registry action callback
//! - 1.0.0: Initial ping handler

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::HandlerContext;
use crate::interaction::Interaction;
use crate::registry::ActionCallback;

/// Handler for /ping
pub struct PingHandler;

#[async_trait]
impl ActionCallback for PingHandler {
    async fn run(&self, _ctx: Arc<HandlerContext>, interaction: &Interaction) -> Result<()> {
        interaction.reply("Pong!").await?;

        if let Some(user) = &interaction.user {
            info!("Ping command completed for user {}", user.id);
        }
        Ok(())
    }
}
