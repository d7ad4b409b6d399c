//! Localized message table
//!
//! Maps each error code to per-locale text, or to a function rendering text
//! from the error context. Resolution for `(code, locale)`:
//!
//! 1. the code's entry for the locale (exact, then language prefix)
//! 2. the code's `default` entry
//! 3. `UnknownError` for the locale
//! 4. `UnknownError`'s default
//!
//! An empty resolved text counts as missing, and the chain ends in the
//! taxonomy's own `UnknownError` message, so resolution is never empty.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: YAML overrides, language-prefix fallback
//! - 1.0.0: Built-in English, French and German entries

use anyhow::{Context as _, Result};
use std::collections::HashMap;
use std::path::Path;

use super::code::ErrorCode;
use super::context::ErrorContext;

/// Locale used for the `default` entry when a table is written out
pub const DEFAULT_LOCALE_KEY: &str = "default";

/// One entry of the table
#[derive(Clone)]
pub enum MessageText {
    Static(String),
    Render(fn(&ErrorContext) -> String),
}

impl MessageText {
    fn resolve(&self, context: &ErrorContext) -> String {
        match self {
            MessageText::Static(text) => text.clone(),
            MessageText::Render(render) => render(context),
        }
    }
}

impl std::fmt::Debug for MessageText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageText::Static(text) => f.debug_tuple("Static").field(text).finish(),
            MessageText::Render(_) => f.write_str("Render(..)"),
        }
    }
}

impl From<&str> for MessageText {
    fn from(text: &str) -> Self {
        MessageText::Static(text.to_string())
    }
}

#[derive(Debug, Clone, Default)]
struct LocalizedMessage {
    default: Option<MessageText>,
    locales: HashMap<String, MessageText>,
}

/// Error code → localized text
#[derive(Debug, Clone, Default)]
pub struct MessageTable {
    entries: HashMap<ErrorCode, LocalizedMessage>,
}

/// On-disk override format: code → (locale | "default") → text
type OverrideDocument = HashMap<ErrorCode, HashMap<String, String>>;

impl MessageTable {
    /// An empty table; every lookup ends at the taxonomy's messages
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with the built-in translations
    pub fn builtin() -> Self {
        let mut table = Self::empty();

        for code in ErrorCode::ALL {
            table.set_default(code, code.default_message());
        }

        table.set_default(ErrorCode::ActionNotFound, MessageText::Render(action_not_found));
        table.set_default(ErrorCode::ActionDisabled, MessageText::Render(action_disabled));

        table.set_locale(ErrorCode::UnknownError, "fr", "Une erreur inconnue est survenue.");
        table.set_locale(ErrorCode::UnknownError, "de", "Ein unbekannter Fehler ist aufgetreten.");
        table.set_locale(ErrorCode::ActionNotFound, "fr", "Cette action est introuvable.");
        table.set_locale(ErrorCode::ActionNotFound, "de", "Diese Aktion wurde nicht gefunden.");
        table.set_locale(ErrorCode::ActionDisabled, "fr", "Cette action est désactivée.");
        table.set_locale(ErrorCode::ActionDisabled, "de", "Diese Aktion ist deaktiviert.");
        table.set_locale(
            ErrorCode::ActionWithoutCallback,
            "fr",
            "Cette action n'est pas encore disponible.",
        );
        table.set_locale(
            ErrorCode::ActionWithoutCallback,
            "de",
            "Diese Aktion ist noch nicht verfügbar.",
        );
        table.set_locale(
            ErrorCode::UnsupportedInteractionType,
            "fr",
            "Ce type d'interaction n'est pas pris en charge.",
        );
        table.set_locale(
            ErrorCode::UnsupportedInteractionType,
            "de",
            "Dieser Interaktionstyp wird nicht unterstützt.",
        );

        table
    }

    pub fn set_default(&mut self, code: ErrorCode, text: impl Into<MessageText>) {
        self.entries.entry(code).or_default().default = Some(text.into());
    }

    pub fn set_locale(&mut self, code: ErrorCode, locale: &str, text: impl Into<MessageText>) {
        self.entries
            .entry(code)
            .or_default()
            .locales
            .insert(locale.to_string(), text.into());
    }

    /// Merge overrides from a YAML document
    ///
    /// ```yaml
    /// ActionNotFound:
    ///   default: "Nothing answers to that."
    ///   fr: "Rien ne répond à cela."
    /// ```
    pub fn merge_yaml(&mut self, yaml: &str) -> Result<usize> {
        let document: OverrideDocument = serde_yaml::from_str(yaml)?;
        let mut merged = 0;
        for (code, texts) in document {
            for (locale, text) in texts {
                if locale == DEFAULT_LOCALE_KEY {
                    self.set_default(code, text.as_str());
                } else {
                    self.set_locale(code, &locale, text.as_str());
                }
                merged += 1;
            }
        }
        Ok(merged)
    }

    /// Merge overrides from a file; a missing file merges nothing
    pub fn merge_file(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            return Ok(0);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading message overrides {}", path.display()))?;
        self.merge_yaml(&contents)
            .with_context(|| format!("parsing message overrides {}", path.display()))
    }

    /// Resolve the user-facing text for `code` in `locale`
    pub fn resolve(&self, code: ErrorCode, locale: &str, context: &ErrorContext) -> String {
        self.lookup(code, locale, context)
            .or_else(|| self.lookup(ErrorCode::UnknownError, locale, context))
            .unwrap_or_else(|| ErrorCode::UnknownError.default_message().to_string())
    }

    fn lookup(&self, code: ErrorCode, locale: &str, context: &ErrorContext) -> Option<String> {
        let entry = self.entries.get(&code)?;
        let language = locale.split(['-', '_']).next().unwrap_or(locale);

        [
            entry.locales.get(locale),
            entry.locales.get(language),
            entry.default.as_ref(),
        ]
        .into_iter()
        .flatten()
        .map(|text| text.resolve(context))
        .find(|text| !text.trim().is_empty())
    }
}

fn action_not_found(context: &ErrorContext) -> String {
    match context.best_identifier() {
        Some(id) => format!("Nothing here answers to `{id}`."),
        None => ErrorCode::ActionNotFound.default_message().to_string(),
    }
}

fn action_disabled(context: &ErrorContext) -> String {
    match context.best_identifier() {
        Some(id) => format!("`{id}` is currently disabled."),
        None => ErrorCode::ActionDisabled.default_message().to_string(),
    }
}
