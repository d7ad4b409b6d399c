//! Serenity payload conversion
//!
//! Turns gateway interactions into the crate's [`Interaction`] tagged union.
//! Classification happens once, here; everything downstream matches on
//! [`InteractionKind`].

use serenity::http::Http;
use serenity::model::application::command::CommandType;
use serenity::model::application::component::ActionRowComponent;
use serenity::model::application::interaction::application_command::{
    CommandData as SerenityCommandData, CommandDataOption,
};
use serenity::model::application::interaction::Interaction as SerenityInteraction;
use serenity::model::user::User;
use std::sync::Arc;

use super::responder::SerenityResponder;
use crate::interaction::{CommandArg, Interaction, InteractionKind, ModalField};

/// Convert a gateway interaction, attaching a reply capability
pub fn convert_interaction(interaction: SerenityInteraction, http: Arc<Http>) -> Interaction {
    match interaction {
        SerenityInteraction::ApplicationCommand(command) => {
            let kind = command_kind(
                command.data.kind,
                &command.data.name,
                flatten_args(&command.data.options),
                command.data.target_id.map(|t| t.0),
            );
            let converted = base(kind, &command.locale, &command.user)
                .with_location(command.guild_id.map(|g| g.0), Some(command.channel_id.0));
            with_resolved(converted, &command.data)
                .with_responder(Arc::new(SerenityResponder::command(http, command)))
        }
        SerenityInteraction::Autocomplete(autocomplete) => {
            let kind = InteractionKind::Autocomplete {
                name: autocomplete.data.name.clone(),
                args: flatten_args(&autocomplete.data.options),
            };
            base(kind, &autocomplete.locale, &autocomplete.user)
                .with_location(
                    autocomplete.guild_id.map(|g| g.0),
                    Some(autocomplete.channel_id.0),
                )
                .with_responder(Arc::new(SerenityResponder::autocomplete(http, autocomplete)))
        }
        SerenityInteraction::MessageComponent(component) => {
            let type_code = serde_json::to_value(&component.data.component_type)
                .ok()
                .and_then(|v| v.as_u64());
            let kind = component_kind(
                type_code,
                &component.data.custom_id,
                &component.data.values,
            );
            base(kind, &component.locale, &component.user)
                .with_location(component.guild_id.map(|g| g.0), Some(component.channel_id.0))
                .with_responder(Arc::new(SerenityResponder::component(http, component)))
        }
        SerenityInteraction::ModalSubmit(modal) => {
            let fields = modal
                .data
                .components
                .iter()
                .flat_map(|row| row.components.iter())
                .filter_map(|component| match component {
                    ActionRowComponent::InputText(input) => Some(ModalField {
                        custom_id: input.custom_id.clone(),
                        value: input.value.clone(),
                    }),
                    _ => None,
                })
                .collect();
            let kind = InteractionKind::ModalSubmit {
                custom_id: modal.data.custom_id.clone(),
                fields,
            };
            base(kind, &modal.locale, &modal.user)
                .with_location(modal.guild_id.map(|g| g.0), Some(modal.channel_id.0))
                .with_responder(Arc::new(SerenityResponder::modal(http, modal)))
        }
        SerenityInteraction::Ping(_) => Interaction::new(InteractionKind::Unsupported {
            kind: "ping".to_string(),
        }),
        #[allow(unreachable_patterns)]
        _ => Interaction::new(InteractionKind::Unsupported {
            kind: "unknown".to_string(),
        }),
    }
}

fn base(kind: InteractionKind, locale: &str, user: &User) -> Interaction {
    Interaction::new(kind)
        .with_locale(locale)
        .with_user(user.id.0, user.name.clone())
}

fn with_resolved(mut interaction: Interaction, data: &SerenityCommandData) -> Interaction {
    let mut users: Vec<(&u64, &String)> = data
        .resolved
        .users
        .iter()
        .map(|(id, user)| (&id.0, &user.name))
        .collect();
    users.sort();
    for (id, name) in users {
        interaction = interaction.with_resolved_user(*id, name.clone());
    }
    interaction
}

/// Kind of an application command interaction
pub fn command_kind(
    kind: CommandType,
    name: &str,
    args: Vec<CommandArg>,
    target_id: Option<u64>,
) -> InteractionKind {
    let name = name.to_string();
    match kind {
        CommandType::ChatInput => InteractionKind::Command { name, args },
        CommandType::User => InteractionKind::UserMenuCommand {
            name,
            target_user_id: target_id,
        },
        CommandType::Message => InteractionKind::MessageMenuCommand {
            name,
            target_message_id: target_id,
        },
        _ => InteractionKind::Unsupported {
            kind: "command".to_string(),
        },
    }
}

/// Kind of a message component interaction from its numeric component type
///
/// Unrecognized types still carrying selected values are treated as a
/// generic select menu.
pub fn component_kind(type_code: Option<u64>, custom_id: &str, values: &[String]) -> InteractionKind {
    let custom_id = custom_id.to_string();
    let values = values.to_vec();
    match type_code {
        Some(2) => InteractionKind::Button { custom_id },
        Some(3) => InteractionKind::StringSelect { custom_id, values },
        Some(5) => InteractionKind::UserSelect { custom_id, values },
        Some(6) => InteractionKind::RoleSelect { custom_id, values },
        Some(7) => InteractionKind::MentionableSelect { custom_id, values },
        Some(8) => InteractionKind::ChannelSelect { custom_id, values },
        _ if !values.is_empty() => InteractionKind::GenericSelect { custom_id, values },
        Some(code) => InteractionKind::Unsupported {
            kind: format!("component-{code}"),
        },
        None => InteractionKind::Unsupported {
            kind: "component".to_string(),
        },
    }
}

/// Options of a command, subcommand options included, in declaration order
pub fn flatten_args(options: &[CommandDataOption]) -> Vec<CommandArg> {
    let mut args = Vec::new();
    for option in options {
        if let Some(value) = &option.value {
            args.push(CommandArg {
                name: option.name.clone(),
                value: value.clone(),
                focused: option.focused,
            });
        }
        args.extend(flatten_args(&option.options));
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_kinds() {
        assert_eq!(
            command_kind(CommandType::ChatInput, "ping", Vec::new(), None),
            InteractionKind::Command {
                name: "ping".to_string(),
                args: Vec::new()
            }
        );
        assert_eq!(
            command_kind(CommandType::User, "Show Profile", Vec::new(), Some(7)),
            InteractionKind::UserMenuCommand {
                name: "Show Profile".to_string(),
                target_user_id: Some(7)
            }
        );
        assert_eq!(
            command_kind(CommandType::Message, "Quote", Vec::new(), Some(9)),
            InteractionKind::MessageMenuCommand {
                name: "Quote".to_string(),
                target_message_id: Some(9)
            }
        );
    }

    #[test]
    fn test_component_kinds() {
        let picked = values(&["a"]);
        assert_eq!(
            component_kind(Some(2), "ok", &[]),
            InteractionKind::Button {
                custom_id: "ok".to_string()
            }
        );
        assert!(matches!(
            component_kind(Some(3), "menu", &picked),
            InteractionKind::StringSelect { .. }
        ));
        assert!(matches!(
            component_kind(Some(5), "menu", &picked),
            InteractionKind::UserSelect { .. }
        ));
        assert!(matches!(
            component_kind(Some(6), "menu", &picked),
            InteractionKind::RoleSelect { .. }
        ));
        assert!(matches!(
            component_kind(Some(7), "menu", &picked),
            InteractionKind::MentionableSelect { .. }
        ));
        assert!(matches!(
            component_kind(Some(8), "menu", &picked),
            InteractionKind::ChannelSelect { .. }
        ));
    }

    #[test]
    fn test_unknown_component_types() {
        assert_eq!(
            component_kind(Some(42), "menu", &values(&["x", "y"])),
            InteractionKind::GenericSelect {
                custom_id: "menu".to_string(),
                values: values(&["x", "y"])
            }
        );
        assert_eq!(
            component_kind(Some(4), "text", &[]),
            InteractionKind::Unsupported {
                kind: "component-4".to_string()
            }
        );
        assert!(matches!(
            component_kind(None, "x", &[]),
            InteractionKind::Unsupported { .. }
        ));
    }
}
