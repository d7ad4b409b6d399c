//! Profile action handlers
//!
//! Handles: /profile, the "Show Profile" user menu, the profile refresh button
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::HandlerContext;
use crate::database::{NewUser, UserRecord};
use crate::interaction::{Interaction, InteractionKind, InteractionUser, ReplyButton};
use crate::registry::ActionCallback;

/// Custom id of the button attached to profile replies
pub const REFRESH_BUTTON_ID: &str = "profile-refresh";

fn refresh_button() -> ReplyButton {
    ReplyButton::new(REFRESH_BUTTON_ID, "🔄 Refresh")
}

/// Shows a user's profile, creating it on first sight
///
/// The target is the menu's target user, the `user` option of the command,
/// or the caller.
pub struct ProfileHandler;

#[async_trait]
impl ActionCallback for ProfileHandler {
    async fn run(&self, ctx: Arc<HandlerContext>, interaction: &Interaction) -> Result<()> {
        let caller = interaction
            .user
            .as_ref()
            .context("profile interaction carries no user")?;
        let target = target_user(interaction).unwrap_or_else(|| caller.clone());

        let (record, created) = ctx.database.find_or_create_user(&new_user(&target)).await?;
        if created {
            info!("Created profile #{} for {}", record.id, record.discord_id);
        }

        interaction
            .reply_ephemeral_with_buttons(&render_profile(&record, created), &[refresh_button()])
            .await
    }
}

/// Refreshes the caller's stored display fields
pub struct ProfileRefreshHandler;

#[async_trait]
impl ActionCallback for ProfileRefreshHandler {
    async fn run(&self, ctx: Arc<HandlerContext>, interaction: &Interaction) -> Result<()> {
        let caller = interaction
            .user
            .as_ref()
            .context("refresh interaction carries no user")?;

        match ctx.database.touch_user(&new_user(caller)).await? {
            Some(record) => {
                let content = format!("🔄 Profile refreshed.\n{}", render_profile(&record, false));
                interaction
                    .reply_ephemeral_with_buttons(&content, &[refresh_button()])
                    .await
            }
            None => {
                interaction
                    .reply_ephemeral("You have no profile yet. Use `/profile` first.")
                    .await
            }
        }
    }
}

fn target_user(interaction: &Interaction) -> Option<InteractionUser> {
    let id = match &interaction.kind {
        InteractionKind::UserMenuCommand { target_user_id, .. } => *target_user_id,
        InteractionKind::Command { .. } => interaction
            .string_arg("user")
            .and_then(|v| v.parse::<u64>().ok()),
        _ => None,
    }?;

    let user = interaction
        .resolved_user(id)
        .cloned()
        .unwrap_or_else(|| InteractionUser {
            id,
            name: id.to_string(),
        });
    Some(user)
}

fn new_user(user: &InteractionUser) -> NewUser {
    NewUser {
        discord_id: user.id.to_string(),
        username: user.name.clone(),
        display_name: user.name.clone(),
    }
}

fn render_profile(record: &UserRecord, created: bool) -> String {
    let mut lines = vec![
        format!("👤 **{}** (<@{}>)", record.display_name, record.discord_id),
        format!("🆔 Profile #{}", record.id),
        format!("🕒 Last seen <t:{}:R>", record.last_seen.timestamp()),
    ];
    if created {
        lines.push("✨ New profile created".to_string());
    }
    lines.join("\n")
}
