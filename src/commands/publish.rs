//! # Command Publication
//!
//! Builds Discord application command definitions from the Action Registry
//! and replaces the remote command set in a single bulk call.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::{CommandOptionType, CommandType};
use std::collections::HashSet;

use super::definition::{CommandData, OptionKind};
use crate::registry::{ActionCategory, ActionRegistry};

/// Application command flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommandKind {
    ChatInput,
    User,
    Message,
}

impl CommandKind {
    fn from_category(category: ActionCategory) -> Option<Self> {
        match category {
            ActionCategory::Command => Some(CommandKind::ChatInput),
            ActionCategory::UserMenuCommand => Some(CommandKind::User),
            ActionCategory::MessageMenuCommand => Some(CommandKind::Message),
            _ => None,
        }
    }
}

/// A command ready to be published
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedCommand {
    pub kind: CommandKind,
    pub data: CommandData,
}

impl PublishedCommand {
    pub fn validate(&self) -> Result<()> {
        match self.kind {
            CommandKind::ChatInput => self.data.validate_chat_input(),
            CommandKind::User | CommandKind::Message => self.data.validate_context_menu(),
        }
    }
}

/// Remote side of publication: replaces the whole command set
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    async fn set_commands(&self, commands: Vec<CreateApplicationCommand>) -> Result<()>;
}

/// Enabled, data-bearing, command-shaped actions, validated and sorted
///
/// Invalid definitions are logged and left out.
pub fn publishable_commands(actions: &ActionRegistry) -> Vec<PublishedCommand> {
    let mut commands: Vec<PublishedCommand> = actions
        .list_all()
        .into_iter()
        .filter(|action| !action.disabled)
        .filter_map(|action| {
            let kind = CommandKind::from_category(action.category)?;
            let data = action.data?;
            Some(PublishedCommand { kind, data })
        })
        .filter(|command| match command.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping command '{}': {e}", command.data.name);
                false
            }
        })
        .collect();

    commands.sort_by(|a, b| (a.kind, &a.data.name).cmp(&(b.kind, &b.data.name)));

    // Discord rejects the whole bulk overwrite on a duplicate name
    let mut seen = HashSet::new();
    commands.retain(|command| {
        let fresh = seen.insert((command.kind, command.data.name.clone()));
        if !fresh {
            warn!(
                "Skipping command '{}': another {:?} command already uses this name",
                command.data.name, command.kind
            );
        }
        fresh
    });
    commands
}

/// Build the Discord definition for one command
pub fn build_command(command: &PublishedCommand) -> CreateApplicationCommand {
    let data = &command.data;
    let mut cmd = CreateApplicationCommand::default();
    cmd.name(&data.name);

    if let Some(dm_permission) = data.dm_permission {
        cmd.dm_permission(dm_permission);
    }

    match command.kind {
        CommandKind::User => {
            cmd.kind(CommandType::User);
        }
        CommandKind::Message => {
            cmd.kind(CommandType::Message);
        }
        CommandKind::ChatInput => {
            cmd.kind(CommandType::ChatInput).description(&data.description);

            for opt in &data.options {
                cmd.create_option(|o| {
                    o.name(&opt.name)
                        .description(&opt.description)
                        .kind(option_type(opt.kind))
                        .required(opt.required)
                        .set_autocomplete(opt.autocomplete);

                    // Add choices if defined
                    for choice in &opt.choices {
                        match opt.kind {
                            OptionKind::Integer => {
                                if let Some(val) = choice.value.as_i64().and_then(|v| i32::try_from(v).ok()) {
                                    o.add_int_choice(&choice.name, val);
                                }
                            }
                            OptionKind::Number => {
                                if let Some(val) = choice.value.as_f64() {
                                    o.add_number_choice(&choice.name, val);
                                }
                            }
                            _ => {
                                let val = match &choice.value {
                                    serde_json::Value::String(s) => s.clone(),
                                    other => other.to_string(),
                                };
                                o.add_string_choice(&choice.name, val);
                            }
                        }
                    }

                    o
                });
            }
        }
    }

    cmd
}

fn option_type(kind: OptionKind) -> CommandOptionType {
    match kind {
        OptionKind::String => CommandOptionType::String,
        OptionKind::Integer => CommandOptionType::Integer,
        OptionKind::Boolean => CommandOptionType::Boolean,
        OptionKind::User => CommandOptionType::User,
        OptionKind::Channel => CommandOptionType::Channel,
        OptionKind::Role => CommandOptionType::Role,
        OptionKind::Mentionable => CommandOptionType::Mentionable,
        OptionKind::Number => CommandOptionType::Number,
        OptionKind::Attachment => CommandOptionType::Attachment,
    }
}

/// Replace the remote command set with everything publishable right now
///
/// This is a full-replace sync: commands no longer in the registry disappear
/// from Discord.
pub async fn publish_commands(
    actions: &ActionRegistry,
    publisher: &dyn CommandPublisher,
) -> Result<usize> {
    let commands = publishable_commands(actions);
    let count = commands.len();
    let built = commands.iter().map(build_command).collect();

    publisher.set_commands(built).await?;
    info!("Published {count} application commands");
    Ok(count)
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingPublisher;
    use super::*;
    use crate::commands::definition::{CommandOptionData, OptionChoice};
    use crate::registry::action::testing::noop_action;

    fn registry_with_commands() -> ActionRegistry {
        let registry = ActionRegistry::new();
        registry
            .register(
                noop_action(ActionCategory::Command, "ping")
                    .with_data(CommandData::new("ping", "Replies with Pong!")),
                false,
            )
            .unwrap();
        registry
            .register(
                noop_action(ActionCategory::UserMenuCommand, "Show Profile")
                    .with_data(CommandData::new("Show Profile", "")),
                false,
            )
            .unwrap();
        // disabled
        registry
            .register(
                noop_action(ActionCategory::Command, "secret")
                    .with_data(CommandData::new("secret", "Hidden"))
                    .disabled(true),
                false,
            )
            .unwrap();
        // no data
        registry
            .register(noop_action(ActionCategory::Command, "bare"), false)
            .unwrap();
        // not command-shaped
        registry
            .register(
                noop_action(ActionCategory::Button, "ok").with_data(CommandData::new("ok", "Ok")),
                false,
            )
            .unwrap();
        // invalid definition
        registry
            .register(
                noop_action(ActionCategory::Command, "Bad")
                    .with_data(CommandData::new("Bad", "Uppercase name")),
                false,
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_publishable_filters() {
        let commands = publishable_commands(&registry_with_commands());
        let names: Vec<&str> = commands.iter().map(|c| c.data.name.as_str()).collect();
        assert_eq!(names, vec!["ping", "Show Profile"]);
        assert_eq!(commands[1].kind, CommandKind::User);
    }

    #[test]
    fn test_duplicate_names_publish_once() {
        let registry = ActionRegistry::new();
        registry
            .register(
                noop_action(ActionCategory::Command, "pinger")
                    .with_data(CommandData::new("ping", "First")),
                false,
            )
            .unwrap();
        registry
            .register(
                noop_action(ActionCategory::Command, "other")
                    .with_data(CommandData::new("ping", "Second")),
                false,
            )
            .unwrap();
        // same name, different kind
        registry
            .register(
                noop_action(ActionCategory::UserMenuCommand, "ping")
                    .with_data(CommandData::new("ping", "")),
                false,
            )
            .unwrap();

        let commands = publishable_commands(&registry);
        let pairs: Vec<(CommandKind, &str)> = commands
            .iter()
            .map(|c| (c.kind, c.data.name.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![(CommandKind::ChatInput, "ping"), (CommandKind::User, "ping")]
        );
    }

    #[test]
    fn test_build_chat_input_command() {
        let mut data = CommandData::new("handlers", "List handlers");
        data.options.push(CommandOptionData {
            name: "limit".to_string(),
            description: "Maximum rows".to_string(),
            kind: OptionKind::Integer,
            required: false,
            autocomplete: false,
            choices: vec![OptionChoice {
                name: "ten".to_string(),
                value: serde_json::json!(10),
            }],
        });

        let cmd = build_command(&PublishedCommand {
            kind: CommandKind::ChatInput,
            data,
        });

        assert_eq!(cmd.0.get("name").unwrap().as_str().unwrap(), "handlers");
        // ChatInput is type 1
        assert_eq!(cmd.0.get("type").unwrap().as_u64().unwrap(), 1);
        let options = cmd.0.get("options").unwrap().as_array().unwrap();
        assert_eq!(options.len(), 1);
        // Integer is type 4
        assert_eq!(options[0].get("type").unwrap().as_u64().unwrap(), 4);
        let choices = options[0].get("choices").unwrap().as_array().unwrap();
        assert_eq!(choices[0].get("value").unwrap().as_i64().unwrap(), 10);
    }

    #[test]
    fn test_build_context_menu_has_no_description() {
        let cmd = build_command(&PublishedCommand {
            kind: CommandKind::Message,
            data: CommandData::new("Quote", ""),
        });
        // Message is type 3
        assert_eq!(cmd.0.get("type").unwrap().as_u64().unwrap(), 3);
        assert!(cmd.0.get("description").is_none());
    }

    #[tokio::test]
    async fn test_publish_is_full_replace() {
        let registry = registry_with_commands();
        let publisher = RecordingPublisher::default();

        let count = publish_commands(&registry, &publisher).await.unwrap();
        assert_eq!(count, 2);

        registry.remove(ActionCategory::Command, "ping");
        publish_commands(&registry, &publisher).await.unwrap();

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0], vec!["ping", "Show Profile"]);
        assert_eq!(published[1], vec!["Show Profile"]);
    }
}
