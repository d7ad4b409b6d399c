//! Action handler records
//!
//! An action answers one interaction category/identifier pair: a slash
//! command, a context menu, a component or a modal.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Tags and command definitions on records
//! - 1.0.0: Initial action records and categories

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::HandlerRecord;
use crate::commands::context::HandlerContext;
use crate::commands::definition::CommandData;
use crate::errors::ErrorCode;
use crate::interaction::{Interaction, InteractionKind};

/// Callback invoked when an interaction resolves to an action
#[async_trait]
pub trait ActionCallback: Send + Sync {
    async fn run(&self, ctx: Arc<HandlerContext>, interaction: &Interaction) -> Result<()>;
}

/// Closed set of interaction categories an action can answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionCategory {
    Command,
    MessageMenuCommand,
    UserMenuCommand,
    StringSelect,
    UserSelect,
    RoleSelect,
    MentionableSelect,
    ChannelSelect,
    GenericSelect,
    Button,
    Autocomplete,
    ModalSubmit,
    /// Anything a manifest names that is not one of the above
    #[serde(other)]
    Unknown,
}

impl ActionCategory {
    pub const ALL: [ActionCategory; 12] = [
        ActionCategory::Command,
        ActionCategory::MessageMenuCommand,
        ActionCategory::UserMenuCommand,
        ActionCategory::StringSelect,
        ActionCategory::UserSelect,
        ActionCategory::RoleSelect,
        ActionCategory::MentionableSelect,
        ActionCategory::ChannelSelect,
        ActionCategory::GenericSelect,
        ActionCategory::Button,
        ActionCategory::Autocomplete,
        ActionCategory::ModalSubmit,
    ];

    /// Prefix of the composite registry key
    pub fn prefix(self) -> &'static str {
        match self {
            ActionCategory::Command => "command",
            ActionCategory::MessageMenuCommand => "message-menu",
            ActionCategory::UserMenuCommand => "user-menu",
            ActionCategory::StringSelect => "string-select",
            ActionCategory::UserSelect => "user-select",
            ActionCategory::RoleSelect => "role-select",
            ActionCategory::MentionableSelect => "mentionable-select",
            ActionCategory::ChannelSelect => "channel-select",
            ActionCategory::GenericSelect => "select",
            ActionCategory::Button => "button",
            ActionCategory::Autocomplete => "autocomplete",
            ActionCategory::ModalSubmit => "modal",
            ActionCategory::Unknown => "unknown",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionCategory::Command => "command",
            ActionCategory::MessageMenuCommand => "message-menu-command",
            ActionCategory::UserMenuCommand => "user-menu-command",
            ActionCategory::StringSelect => "string-select",
            ActionCategory::UserSelect => "user-select",
            ActionCategory::RoleSelect => "role-select",
            ActionCategory::MentionableSelect => "mentionable-select",
            ActionCategory::ChannelSelect => "channel-select",
            ActionCategory::GenericSelect => "generic-select",
            ActionCategory::Button => "button",
            ActionCategory::Autocomplete => "autocomplete",
            ActionCategory::ModalSubmit => "modal-submit",
            ActionCategory::Unknown => "unknown",
        }
    }

    /// Categories published to Discord as application commands
    pub fn is_command_shaped(self) -> bool {
        matches!(
            self,
            ActionCategory::Command
                | ActionCategory::MessageMenuCommand
                | ActionCategory::UserMenuCommand
        )
    }

    /// Category of an interaction, `None` for shapes no action can answer
    pub fn classify(kind: &InteractionKind) -> Option<ActionCategory> {
        let category = match kind {
            InteractionKind::Command { .. } => ActionCategory::Command,
            InteractionKind::MessageMenuCommand { .. } => ActionCategory::MessageMenuCommand,
            InteractionKind::UserMenuCommand { .. } => ActionCategory::UserMenuCommand,
            InteractionKind::StringSelect { .. } => ActionCategory::StringSelect,
            InteractionKind::UserSelect { .. } => ActionCategory::UserSelect,
            InteractionKind::RoleSelect { .. } => ActionCategory::RoleSelect,
            InteractionKind::MentionableSelect { .. } => ActionCategory::MentionableSelect,
            InteractionKind::ChannelSelect { .. } => ActionCategory::ChannelSelect,
            InteractionKind::GenericSelect { .. } => ActionCategory::GenericSelect,
            InteractionKind::Button { .. } => ActionCategory::Button,
            InteractionKind::Autocomplete { .. } => ActionCategory::Autocomplete,
            InteractionKind::ModalSubmit { .. } => ActionCategory::ModalSubmit,
            InteractionKind::Unsupported { .. } => return None,
        };
        Some(category)
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Action handler record
#[derive(Clone)]
pub struct Action {
    pub identifier: String,
    pub category: ActionCategory,
    pub disabled: bool,
    /// Free-form labels; never consulted by registration or dispatch
    pub tags: BTreeSet<String>,
    /// Definition published to Discord, command-shaped categories only
    pub data: Option<CommandData>,
    pub callback: Option<Arc<dyn ActionCallback>>,
}

impl Action {
    pub fn new(category: ActionCategory, identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            category,
            disabled: false,
            tags: BTreeSet::new(),
            data: None,
            callback: None,
        }
    }

    pub fn with_callback(mut self, callback: Arc<dyn ActionCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn with_data(mut self, data: CommandData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        let same_callback = match (&self.callback, &other.callback) {
            (Some(a), Some(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (None, None) => true,
            _ => false,
        };
        self.identifier == other.identifier
            && self.category == other.category
            && self.disabled == other.disabled
            && self.tags == other.tags
            && self.data == other.data
            && same_callback
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("identifier", &self.identifier)
            .field("category", &self.category)
            .field("disabled", &self.disabled)
            .field("tags", &self.tags)
            .field("data", &self.data)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl HandlerRecord for Action {
    type Category = ActionCategory;

    const NOUN: &'static str = "action";
    const ALREADY_EXISTS: ErrorCode = ErrorCode::ActionIdentifierAlreadyExists;
    const NOT_FOUND: ErrorCode = ErrorCode::ActionNotFound;
    const DISABLED: ErrorCode = ErrorCode::ActionDisabled;
    const WITHOUT_CALLBACK: ErrorCode = ErrorCode::ActionWithoutCallback;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn category(&self) -> ActionCategory {
        self.category
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn composite_key(category: ActionCategory, identifier: &str) -> String {
        format!("{}-{}", category.prefix(), identifier)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_composite_key() {
        assert_eq!(Action::composite_key(ActionCategory::Command, "ping"), "command-ping");
        assert_eq!(Action::composite_key(ActionCategory::ModalSubmit, "fb"), "modal-fb");
        assert_eq!(Action::composite_key(ActionCategory::Unknown, "x"), "unknown-x");
    }

    #[test]
    fn test_prefixes_are_distinct() {
        let mut prefixes: Vec<&str> = ActionCategory::ALL.iter().map(|c| c.prefix()).collect();
        prefixes.push(ActionCategory::Unknown.prefix());
        let count = prefixes.len();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), count);
    }

    #[test]
    fn test_category_names_round_trip_through_serde() {
        for category in ActionCategory::ALL {
            let parsed: ActionCategory =
                serde_yaml::from_str(category.name()).expect("category parses");
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_unrecognized_category_parses_as_unknown() {
        let parsed: ActionCategory = serde_yaml::from_str("slash-thing").unwrap();
        assert_eq!(parsed, ActionCategory::Unknown);
    }

    #[test]
    fn test_classify_is_total() {
        let button = InteractionKind::Button {
            custom_id: "ok".to_string(),
        };
        assert_eq!(ActionCategory::classify(&button), Some(ActionCategory::Button));

        let ping = InteractionKind::Unsupported {
            kind: "ping".to_string(),
        };
        assert_eq!(ActionCategory::classify(&ping), None);
    }

    #[test]
    fn test_command_shaped() {
        assert!(ActionCategory::Command.is_command_shaped());
        assert!(ActionCategory::UserMenuCommand.is_command_shaped());
        assert!(!ActionCategory::Autocomplete.is_command_shaped());
        assert!(!ActionCategory::Button.is_command_shaped());
    }

    #[test]
    fn test_equality_compares_callback_identity() {
        let a = noop_action(ActionCategory::Command, "ping");
        let b = noop_action(ActionCategory::Command, "ping");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
