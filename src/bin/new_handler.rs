//! Interactive handler manifest scaffold
//!
//! Writes a new action or event manifest under the definitions tree and
//! validates that it loads against the built-in registration tables.
//!
//! Usage: cargo run --features scaffold --bin new-handler

use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, Input, Select};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use courier::commands::{create_action_catalog, CommandData};
use courier::events::EVENT_HANDLER_NAMES;
use courier::loader::{ActionManifest, EventManifest, FromManifest};
use courier::registry::{Action, ActionCategory, EventKind};

const NO_HANDLER: &str = "(none - load without a callback)";

fn main() -> Result<()> {
    println!("Handler Scaffold Generator");
    println!("==========================\n");

    let kinds = ["action", "event"];
    let kind = Select::new()
        .with_prompt("Handler kind")
        .items(&kinds)
        .default(0)
        .interact()?;

    let (path, yaml) = if kinds[kind] == "action" {
        scaffold_action()?
    } else {
        scaffold_event()?
    };

    if path.exists() {
        bail!("{} already exists", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(&path, &yaml).with_context(|| format!("writing {}", path.display()))?;

    println!("\nCreated: {}", path.display());
    println!("Restart the bot to load it.");
    Ok(())
}

fn scaffold_action() -> Result<(PathBuf, String)> {
    let categories: Vec<&str> = ActionCategory::ALL.iter().map(|c| c.name()).collect();
    let index = Select::new()
        .with_prompt("Category")
        .items(&categories)
        .default(0)
        .interact()?;
    let category = ActionCategory::ALL[index];

    let identifier: String = Input::new()
        .with_prompt(if category.is_command_shaped() {
            "Command name"
        } else {
            "Custom id"
        })
        .validate_with(|input: &String| -> Result<(), String> {
            if input.trim().is_empty() {
                return Err("Identifier cannot be empty".to_string());
            }
            Ok(())
        })
        .interact_text()?;

    let data = if category.is_command_shaped() {
        let description: String = if category == ActionCategory::Command {
            Input::<String>::new()
                .with_prompt("Description (max 100 chars)")
                .interact_text()?
        } else {
            String::new()
        };
        Some(CommandData::new(identifier.clone(), description))
    } else {
        None
    };

    let catalog = create_action_catalog();
    let mut handlers: Vec<&str> = catalog.names();
    handlers.push(NO_HANDLER);
    let handler = pick_handler(&handlers)?;

    let manifest = ActionManifest {
        identifier: data.is_none().then(|| identifier.clone()),
        category,
        disabled: false,
        tags: BTreeSet::new(),
        data,
        handler,
    };
    let yaml = serde_yaml::to_string(&manifest)?;

    // Round-trip through the loader's own checks
    let parsed: ActionManifest = serde_yaml::from_str(&yaml)?;
    let action = Action::from_manifest(parsed, &catalog)?;
    if let Some(data) = &action.data {
        let check = match category {
            ActionCategory::Command => data.validate_chat_input(),
            _ => data.validate_context_menu(),
        };
        check.context("command definition would be rejected at publication")?;
    }
    println!("\nValidation passed: {}-{}", category.prefix(), action.identifier);

    let path = Path::new("definitions/actions")
        .join(category.prefix())
        .join(format!("{}.yaml", file_stem(&identifier)));
    Ok((path, yaml))
}

fn scaffold_event() -> Result<(PathBuf, String)> {
    let kinds = [
        EventKind::Ready,
        EventKind::CacheReady,
        EventKind::Resume,
        EventKind::GuildCreate,
        EventKind::GuildDelete,
        EventKind::MessageCreate,
        EventKind::InteractionCreate,
    ];
    let names: Vec<&str> = kinds.iter().map(|k| k.name()).collect();
    let index = Select::new()
        .with_prompt("Event")
        .items(&names)
        .default(0)
        .interact()?;

    let identifier: String = Input::new()
        .with_prompt("Identifier (unique across all events)")
        .validate_with(|input: &String| -> Result<(), String> {
            if input.trim().is_empty() {
                return Err("Identifier cannot be empty".to_string());
            }
            Ok(())
        })
        .interact_text()?;

    let once = Confirm::new()
        .with_prompt("Unsubscribe after the first delivery?")
        .default(false)
        .interact()?;

    let mut handlers: Vec<&str> = EVENT_HANDLER_NAMES.to_vec();
    handlers.push(NO_HANDLER);
    let handler = pick_handler(&handlers)?;

    let manifest = EventManifest {
        identifier: identifier.clone(),
        event: kinds[index],
        once,
        disabled: false,
        tags: BTreeSet::new(),
        handler,
    };
    let yaml = serde_yaml::to_string(&manifest)?;
    let parsed: EventManifest = serde_yaml::from_str(&yaml)?;
    println!("\nValidation passed: {} on {}", parsed.identifier, parsed.event);

    let path = Path::new("definitions/events").join(format!("{}.yaml", file_stem(&identifier)));
    Ok((path, yaml))
}

fn pick_handler(handlers: &[&str]) -> Result<Option<String>> {
    let index = Select::new()
        .with_prompt("Handler")
        .items(handlers)
        .default(0)
        .interact()?;
    Ok(Some(handlers[index])
        .filter(|name| *name != NO_HANDLER)
        .map(str::to_string))
}

/// File name for an identifier ("Show Profile" -> "show-profile")
fn file_stem(identifier: &str) -> String {
    identifier
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}
