//! Registry listing handlers
//!
//! Handles: /handlers, autocomplete for its `category` option
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::HandlerContext;
use crate::core::truncate_for_message;
use crate::interaction::Interaction;
use crate::registry::{Action, ActionCallback, ActionCategory, HandlerRecord};

/// Lists the Action Registry, optionally narrowed to one category
pub struct HandlersListHandler;

#[async_trait]
impl ActionCallback for HandlersListHandler {
    async fn run(&self, ctx: Arc<HandlerContext>, interaction: &Interaction) -> Result<()> {
        let filter = match interaction.string_arg("category") {
            None => None,
            Some(name) => match parse_category(name) {
                Some(category) => Some(category),
                None => {
                    return interaction
                        .reply_ephemeral(&format!("Unknown category `{name}`."))
                        .await;
                }
            },
        };

        // Snapshot; entries may change while the reply is in flight
        let mut actions: Vec<Action> = ctx
            .actions
            .list_all()
            .into_iter()
            .filter(|a| filter.map_or(true, |c| a.category == c))
            .collect();
        actions.sort_by_key(|a| a.key());

        interaction
            .reply_ephemeral(&truncate_for_message(&render_listing(&actions, filter)))
            .await
    }
}

/// Suggests categories matching what has been typed so far
pub struct CategoryAutocomplete;

#[async_trait]
impl ActionCallback for CategoryAutocomplete {
    async fn run(&self, _ctx: Arc<HandlerContext>, interaction: &Interaction) -> Result<()> {
        let typed = interaction
            .focused_arg()
            .and_then(|arg| arg.value.as_str())
            .unwrap_or("")
            .to_lowercase();

        let choices = ActionCategory::ALL
            .iter()
            .map(|c| c.name())
            .filter(|name| name.contains(typed.as_str()))
            .map(|name| (name.to_string(), name.to_string()))
            .collect();

        interaction.autocomplete(choices).await
    }
}

fn parse_category(name: &str) -> Option<ActionCategory> {
    ActionCategory::ALL
        .iter()
        .copied()
        .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
}

fn render_listing(actions: &[Action], filter: Option<ActionCategory>) -> String {
    let heading = match filter {
        Some(category) => format!("**Handlers ({category})**"),
        None => "**Handlers**".to_string(),
    };
    if actions.is_empty() {
        return format!("{heading}\nNo handlers registered.");
    }

    let mut lines = vec![format!("{heading} - {} registered", actions.len())];
    for action in actions {
        let mut line = format!("`{}`", action.key());
        if action.disabled {
            line.push_str(" (disabled)");
        }
        if action.callback.is_none() {
            line.push_str(" (no callback)");
        }
        if !action.tags.is_empty() {
            let tags: Vec<&str> = action.tags.iter().map(String::as_str).collect();
            line.push_str(&format!(" [{}]", tags.join(", ")));
        }
        lines.push(line);
    }
    lines.join("\n")
}
