//! # Interactions
//!
//! Transport-independent view of an inbound Discord interaction. The gateway
//! layer builds one of these per interaction; everything past the gateway
//! only sees this tagged union.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::errors::InteractionSummary;

/// Default locale when the platform does not report one
pub const DEFAULT_LOCALE: &str = "en-US";

/// A single option passed to a command or autocomplete interaction
#[derive(Debug, Clone, PartialEq)]
pub struct CommandArg {
    pub name: String,
    pub value: serde_json::Value,
    pub focused: bool,
}

/// One submitted text input of a modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalField {
    pub custom_id: String,
    pub value: String,
}

/// Shape of an interaction, one variant per supported category
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionKind {
    Command { name: String, args: Vec<CommandArg> },
    MessageMenuCommand { name: String, target_message_id: Option<u64> },
    UserMenuCommand { name: String, target_user_id: Option<u64> },
    StringSelect { custom_id: String, values: Vec<String> },
    UserSelect { custom_id: String, values: Vec<String> },
    RoleSelect { custom_id: String, values: Vec<String> },
    MentionableSelect { custom_id: String, values: Vec<String> },
    ChannelSelect { custom_id: String, values: Vec<String> },
    /// A select menu whose concrete type the transport did not report
    GenericSelect { custom_id: String, values: Vec<String> },
    Button { custom_id: String },
    Autocomplete { name: String, args: Vec<CommandArg> },
    ModalSubmit { custom_id: String, fields: Vec<ModalField> },
    /// Anything the transport delivered that no category covers (pings, new types)
    Unsupported { kind: String },
}

impl InteractionKind {
    /// Short label used in logs
    pub fn label(&self) -> &str {
        match self {
            InteractionKind::Command { .. } => "command",
            InteractionKind::MessageMenuCommand { .. } => "message-menu-command",
            InteractionKind::UserMenuCommand { .. } => "user-menu-command",
            InteractionKind::StringSelect { .. } => "string-select",
            InteractionKind::UserSelect { .. } => "user-select",
            InteractionKind::RoleSelect { .. } => "role-select",
            InteractionKind::MentionableSelect { .. } => "mentionable-select",
            InteractionKind::ChannelSelect { .. } => "channel-select",
            InteractionKind::GenericSelect { .. } => "generic-select",
            InteractionKind::Button { .. } => "button",
            InteractionKind::Autocomplete { .. } => "autocomplete",
            InteractionKind::ModalSubmit { .. } => "modal-submit",
            InteractionKind::Unsupported { kind } => kind.as_str(),
        }
    }
}

/// A button attached to a reply, routed back by its custom id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyButton {
    pub custom_id: String,
    pub label: String,
}

impl ReplyButton {
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            label: label.into(),
        }
    }
}

/// Reply capability supplied by the transport for repliable interactions
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Whether a reply can still be delivered to the caller
    fn is_repliable(&self) -> bool;

    /// Send a text reply with optional buttons; `ephemeral` replies are only
    /// visible to the caller
    async fn reply(&self, content: &str, ephemeral: bool, buttons: &[ReplyButton]) -> Result<()>;

    /// Answer an autocomplete interaction with `(name, value)` choices
    async fn autocomplete(&self, choices: Vec<(String, String)>) -> Result<()>;
}

/// Who triggered the interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionUser {
    pub id: u64,
    pub name: String,
}

/// An inbound interaction
#[derive(Clone)]
pub struct Interaction {
    pub kind: InteractionKind,
    pub locale: String,
    pub user: Option<InteractionUser>,
    pub guild_id: Option<u64>,
    pub channel_id: Option<u64>,
    /// Users the payload resolved (command options, menu targets)
    pub resolved_users: Vec<InteractionUser>,
    responder: Option<Arc<dyn InteractionResponder>>,
}

impl Interaction {
    pub fn new(kind: InteractionKind) -> Self {
        Self {
            kind,
            locale: DEFAULT_LOCALE.to_string(),
            user: None,
            guild_id: None,
            channel_id: None,
            resolved_users: Vec::new(),
            responder: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        let locale = locale.into();
        if !locale.is_empty() {
            self.locale = locale;
        }
        self
    }

    pub fn with_user(mut self, id: u64, name: impl Into<String>) -> Self {
        self.user = Some(InteractionUser {
            id,
            name: name.into(),
        });
        self
    }

    pub fn with_location(mut self, guild_id: Option<u64>, channel_id: Option<u64>) -> Self {
        self.guild_id = guild_id;
        self.channel_id = channel_id;
        self
    }

    pub fn with_resolved_user(mut self, id: u64, name: impl Into<String>) -> Self {
        self.resolved_users.push(InteractionUser {
            id,
            name: name.into(),
        });
        self
    }

    pub fn resolved_user(&self, id: u64) -> Option<&InteractionUser> {
        self.resolved_users.iter().find(|u| u.id == id)
    }

    pub fn with_responder(mut self, responder: Arc<dyn InteractionResponder>) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Declared name for commands and menus, caller-assigned id for components and modals
    pub fn identifier(&self) -> Option<&str> {
        let id = match &self.kind {
            InteractionKind::Command { name, .. }
            | InteractionKind::MessageMenuCommand { name, .. }
            | InteractionKind::UserMenuCommand { name, .. }
            | InteractionKind::Autocomplete { name, .. } => name.as_str(),
            InteractionKind::StringSelect { custom_id, .. }
            | InteractionKind::UserSelect { custom_id, .. }
            | InteractionKind::RoleSelect { custom_id, .. }
            | InteractionKind::MentionableSelect { custom_id, .. }
            | InteractionKind::ChannelSelect { custom_id, .. }
            | InteractionKind::GenericSelect { custom_id, .. }
            | InteractionKind::Button { custom_id }
            | InteractionKind::ModalSubmit { custom_id, .. } => custom_id.as_str(),
            InteractionKind::Unsupported { .. } => return None,
        };
        (!id.is_empty()).then_some(id)
    }

    /// Options of a command or autocomplete interaction
    pub fn args(&self) -> &[CommandArg] {
        match &self.kind {
            InteractionKind::Command { args, .. } | InteractionKind::Autocomplete { args, .. } => {
                args
            }
            _ => &[],
        }
    }

    pub fn arg(&self, name: &str) -> Option<&serde_json::Value> {
        self.args().iter().find(|a| a.name == name).map(|a| &a.value)
    }

    pub fn string_arg(&self, name: &str) -> Option<&str> {
        self.arg(name).and_then(|v| v.as_str())
    }

    /// The option currently being typed in an autocomplete interaction
    pub fn focused_arg(&self) -> Option<&CommandArg> {
        self.args().iter().find(|a| a.focused)
    }

    /// Whether a reply can be delivered back to the caller
    ///
    /// Autocomplete interactions only accept choices. Everything else is
    /// repliable while its responder is.
    pub fn is_repliable(&self) -> bool {
        !matches!(self.kind, InteractionKind::Autocomplete { .. })
            && self.responder.as_ref().is_some_and(|r| r.is_repliable())
    }

    /// Reply visible to everyone in the channel
    pub async fn reply(&self, content: &str) -> Result<()> {
        self.responder()?.reply(content, false, &[]).await
    }

    /// Reply visible only to the caller
    pub async fn reply_ephemeral(&self, content: &str) -> Result<()> {
        self.responder()?.reply(content, true, &[]).await
    }

    /// Ephemeral reply carrying buttons
    pub async fn reply_ephemeral_with_buttons(
        &self,
        content: &str,
        buttons: &[ReplyButton],
    ) -> Result<()> {
        self.responder()?.reply(content, true, buttons).await
    }

    pub async fn autocomplete(&self, choices: Vec<(String, String)>) -> Result<()> {
        self.responder()?.autocomplete(choices).await
    }

    fn responder(&self) -> Result<&Arc<dyn InteractionResponder>> {
        self.responder
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("interaction has no reply channel"))
    }

    pub fn summary(&self) -> InteractionSummary {
        InteractionSummary {
            kind: self.kind.label().to_string(),
            identifier: self.identifier().map(str::to_string),
            locale: self.locale.clone(),
            user_id: self.user.as_ref().map(|u| u.id),
        }
    }
}

impl fmt::Debug for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("kind", &self.kind)
            .field("locale", &self.locale)
            .field("user", &self.user)
            .field("guild_id", &self.guild_id)
            .field("channel_id", &self.channel_id)
            .field("repliable", &self.is_repliable())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_identifier_for_commands_uses_name() {
        let interaction = Interaction::new(command("ping"));
        assert_eq!(interaction.identifier(), Some("ping"));
    }

    #[test]
    fn test_identifier_for_components_uses_custom_id() {
        let interaction = Interaction::new(InteractionKind::Button {
            custom_id: "profile-refresh".to_string(),
        });
        assert_eq!(interaction.identifier(), Some("profile-refresh"));
    }

    #[test]
    fn test_empty_identifier_is_none() {
        let interaction = Interaction::new(InteractionKind::ModalSubmit {
            custom_id: String::new(),
            fields: vec![],
        });
        assert!(interaction.identifier().is_none());

        let ping = Interaction::new(InteractionKind::Unsupported {
            kind: "ping".to_string(),
        });
        assert!(ping.identifier().is_none());
    }

    #[test]
    fn test_empty_locale_keeps_default() {
        let interaction = Interaction::new(command("ping")).with_locale("");
        assert_eq!(interaction.locale, DEFAULT_LOCALE);
    }

    #[test]
    fn test_repliable_requires_open_responder() {
        let none = Interaction::new(command("ping"));
        assert!(!none.is_repliable());

        let open = Interaction::new(command("ping"))
            .with_responder(Arc::new(RecordingResponder::default()));
        assert!(open.is_repliable());

        let closed =
            Interaction::new(command("ping")).with_responder(Arc::new(RecordingResponder::closed()));
        assert!(!closed.is_repliable());
    }

    #[test]
    fn test_autocomplete_is_never_repliable() {
        let interaction = Interaction::new(InteractionKind::Autocomplete {
            name: "handlers".to_string(),
            args: vec![],
        })
        .with_responder(Arc::new(RecordingResponder::default()));
        assert!(!interaction.is_repliable());
    }

    #[test]
    fn test_unsupported_component_with_open_responder_is_repliable() {
        let interaction = Interaction::new(InteractionKind::Unsupported {
            kind: "component-99".to_string(),
        })
        .with_responder(Arc::new(RecordingResponder::default()));
        assert!(interaction.is_repliable());

        let ping = Interaction::new(InteractionKind::Unsupported {
            kind: "ping".to_string(),
        });
        assert!(!ping.is_repliable());
    }

    #[tokio::test]
    async fn test_reply_with_buttons() {
        let responder = Arc::new(RecordingResponder::default());
        let interaction = Interaction::new(command("profile")).with_responder(responder.clone());

        interaction
            .reply_ephemeral_with_buttons("hi", &[ReplyButton::new("profile-refresh", "Refresh")])
            .await
            .unwrap();

        assert_eq!(responder.replies(), vec![("hi".to_string(), true)]);
        assert_eq!(responder.buttons(), vec![vec!["profile-refresh".to_string()]]);
    }

    #[tokio::test]
    async fn test_reply_goes_through_responder() {
        let responder = Arc::new(RecordingResponder::default());
        let interaction = Interaction::new(command("ping")).with_responder(responder.clone());

        interaction.reply("Pong!").await.unwrap();
        interaction.reply_ephemeral("psst").await.unwrap();

        assert_eq!(
            responder.replies(),
            vec![("Pong!".to_string(), false), ("psst".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn test_reply_without_responder_fails() {
        let interaction = Interaction::new(command("ping"));
        assert!(interaction.reply("Pong!").await.is_err());
    }

    #[test]
    fn test_focused_arg() {
        let interaction = Interaction::new(InteractionKind::Autocomplete {
            name: "handlers".to_string(),
            args: vec![
                CommandArg {
                    name: "tag".to_string(),
                    value: serde_json::json!("x"),
                    focused: false,
                },
                CommandArg {
                    name: "category".to_string(),
                    value: serde_json::json!("but"),
                    focused: true,
                },
            ],
        });
        assert_eq!(interaction.focused_arg().unwrap().name, "category");
        assert_eq!(interaction.string_arg("tag"), Some("x"));
    }
}
