//! # Command Definitions
//!
//! The externally visible shape of command-shaped actions, as written in
//! handler manifests and published to Discord.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Discord's limit on options per command
pub const MAX_OPTIONS: usize = 25;
/// Discord's limit on command and option names
pub const MAX_NAME_LEN: usize = 32;
/// Discord's limit on command and option descriptions
pub const MAX_DESCRIPTION_LEN: usize = 100;

fn chat_input_name() -> &'static Regex {
    static NAME: OnceLock<Regex> = OnceLock::new();
    NAME.get_or_init(|| Regex::new(r"^[-_\p{Ll}\p{N}]{1,32}$").expect("valid name pattern"))
}

/// A command definition
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommandData {
    /// Command name (lowercase for slash commands, free text for context menus)
    pub name: String,

    /// Description shown in Discord; ignored for context menu commands
    #[serde(default)]
    pub description: String,

    /// Command parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionData>,

    /// Whether the command is usable in direct messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm_permission: Option<bool>,
}

/// A single command option/parameter
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommandOptionData {
    pub name: String,

    pub description: String,

    /// Option type: string, integer, boolean, user, channel, role, mentionable, number, attachment
    #[serde(rename = "type", default)]
    pub kind: OptionKind,

    #[serde(default)]
    pub required: bool,

    /// Whether Discord should send autocomplete interactions for this option
    #[serde(default)]
    pub autocomplete: bool,

    /// Predefined choices
    #[serde(default)]
    pub choices: Vec<OptionChoice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    #[default]
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

/// A predefined choice for an option
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OptionChoice {
    pub name: String,
    pub value: serde_json::Value,
}

impl CommandData {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
            dm_permission: None,
        }
    }

    /// Validate against Discord's limits for a slash command
    pub fn validate_chat_input(&self) -> Result<()> {
        if !chat_input_name().is_match(&self.name) {
            return Err(anyhow::anyhow!(
                "Command name must be 1-32 lowercase characters: {}",
                self.name
            ));
        }
        check_description(&self.name, &self.description)?;
        if self.options.len() > MAX_OPTIONS {
            return Err(anyhow::anyhow!(
                "Command {} has {} options (max {MAX_OPTIONS})",
                self.name,
                self.options.len()
            ));
        }
        for opt in &self.options {
            if !chat_input_name().is_match(&opt.name) {
                return Err(anyhow::anyhow!(
                    "Option name must be 1-32 lowercase characters: {} in command {}",
                    opt.name,
                    self.name
                ));
            }
            check_description(&opt.name, &opt.description)?;
        }
        Ok(())
    }

    /// Validate against Discord's limits for a user/message context menu
    pub fn validate_context_menu(&self) -> Result<()> {
        let len = self.name.chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(anyhow::anyhow!(
                "Context menu name must be 1-32 characters: {}",
                self.name
            ));
        }
        if !self.options.is_empty() {
            return Err(anyhow::anyhow!(
                "Context menu {} cannot take options",
                self.name
            ));
        }
        Ok(())
    }
}

fn check_description(name: &str, description: &str) -> Result<()> {
    let len = description.chars().count();
    if len == 0 || len > MAX_DESCRIPTION_LEN {
        return Err(anyhow::anyhow!(
            "Description of {name} must be 1-100 characters (got {len})"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(name: &str) -> CommandOptionData {
        CommandOptionData {
            name: name.to_string(),
            description: "An option".to_string(),
            kind: OptionKind::String,
            required: false,
            autocomplete: false,
            choices: vec![],
        }
    }

    #[test]
    fn test_parse_from_yaml() {
        let data: CommandData = serde_yaml::from_str(
            r#"
name: handlers
description: List registered handlers
options:
  - name: category
    description: Only show this category
    autocomplete: true
  - name: limit
    description: Maximum rows
    type: integer
    choices:
      - name: ten
        value: 10
"#,
        )
        .unwrap();

        assert_eq!(data.options.len(), 2);
        assert_eq!(data.options[0].kind, OptionKind::String);
        assert!(data.options[0].autocomplete);
        assert_eq!(data.options[1].kind, OptionKind::Integer);
        assert_eq!(data.options[1].choices[0].value, serde_json::json!(10));
    }

    #[test]
    fn test_valid_chat_input() {
        let data = CommandData::new("ping", "Replies with Pong!");
        assert!(data.validate_chat_input().is_ok());
    }

    #[test]
    fn test_uppercase_name_rejected() {
        let data = CommandData::new("Ping", "Replies with Pong!");
        assert!(data.validate_chat_input().is_err());
    }

    #[test]
    fn test_empty_description_rejected() {
        let data = CommandData::new("ping", "");
        assert!(data.validate_chat_input().is_err());
    }

    #[test]
    fn test_long_description_rejected() {
        let data = CommandData::new("ping", "a".repeat(101));
        assert!(data.validate_chat_input().is_err());
    }

    #[test]
    fn test_too_many_options_rejected() {
        let mut data = CommandData::new("ping", "Replies");
        data.options = (0..26).map(|i| option(&format!("o{i}"))).collect();
        assert!(data.validate_chat_input().is_err());
    }

    #[test]
    fn test_invalid_option_name_rejected() {
        let mut data = CommandData::new("ping", "Replies");
        data.options.push(option("Bad Name"));
        assert!(data.validate_chat_input().is_err());
    }

    #[test]
    fn test_context_menu_allows_spaces_and_case() {
        let data = CommandData::new("Show Profile", "");
        assert!(data.validate_context_menu().is_ok());
        assert!(data.validate_chat_input().is_err());
    }
}
