//! Diagnostic context and taxonomy-tagged errors
//!
//! A `ContextLogger` is owned by one dispatch or one folder load. It
//! accumulates what is known about the operation so far and stamps a snapshot
//! of it onto every `CoreError` it builds.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Request ids on every log line
//! - 1.0.0: Typed context replacing free-form key/value maps

use log::{debug, error, info, warn};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use super::code::{ErrorCode, Severity};

/// What the context knows about the inbound interaction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionSummary {
    pub kind: String,
    pub identifier: Option<String>,
    pub locale: String,
    pub user_id: Option<u64>,
}

/// What the context knows about the resolved handler
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandlerSummary {
    pub key: String,
    pub category: String,
    pub identifier: String,
    pub disabled: bool,
}

/// Snapshot of diagnostic context attached to an error
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    pub interaction: Option<InteractionSummary>,
    pub handler: Option<HandlerSummary>,
    pub path: Option<PathBuf>,
    pub identifier: Option<String>,
    pub category: Option<String>,
    pub detail: Option<String>,
}

impl ErrorContext {
    pub fn is_empty(&self) -> bool {
        *self == ErrorContext::default()
    }

    /// Fill every field that is unset here from `other`
    pub fn merge_missing(&mut self, other: &ErrorContext) {
        if self.interaction.is_none() {
            self.interaction = other.interaction.clone();
        }
        if self.handler.is_none() {
            self.handler = other.handler.clone();
        }
        if self.path.is_none() {
            self.path = other.path.clone();
        }
        if self.identifier.is_none() {
            self.identifier = other.identifier.clone();
        }
        if self.category.is_none() {
            self.category = other.category.clone();
        }
        if self.detail.is_none() {
            self.detail = other.detail.clone();
        }
    }

    /// Best known identifier: explicit, then handler, then interaction
    pub fn best_identifier(&self) -> Option<&str> {
        self.identifier
            .as_deref()
            .or_else(|| self.handler.as_ref().map(|h| h.identifier.as_str()))
            .or_else(|| self.interaction.as_ref().and_then(|i| i.identifier.as_deref()))
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<String> = Vec::new();
        if let Some(interaction) = &self.interaction {
            fields.push(format!("interaction={}", interaction.kind));
            if let Some(id) = &interaction.identifier {
                fields.push(format!("interaction_id={id}"));
            }
            fields.push(format!("locale={}", interaction.locale));
            if let Some(user) = interaction.user_id {
                fields.push(format!("user={user}"));
            }
        }
        if let Some(handler) = &self.handler {
            fields.push(format!("handler={}", handler.key));
        }
        if let Some(path) = &self.path {
            fields.push(format!("path={}", path.display()));
        }
        if let Some(identifier) = &self.identifier {
            fields.push(format!("identifier={identifier}"));
        }
        if let Some(category) = &self.category {
            fields.push(format!("category={category}"));
        }
        if let Some(detail) = &self.detail {
            fields.push(format!("detail={detail:?}"));
        }
        f.write_str(&fields.join(" "))
    }
}

/// Taxonomy-tagged error carrying a context snapshot
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct CoreError {
    pub code: ErrorCode,
    pub severity: Severity,
    pub loggable: bool,
    pub message: String,
    pub context: ErrorContext,
}

impl CoreError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            severity: code.severity(),
            loggable: code.loggable(),
            message: code.default_message().to_string(),
            context: ErrorContext::default(),
        }
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.context.identifier = Some(identifier.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.context.category = Some(category.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.context.path = Some(path.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.context.detail = Some(detail.into());
        self
    }
}

/// Accumulates context for one operation and builds errors from it
#[derive(Debug, Clone)]
pub struct ContextLogger {
    scope: &'static str,
    request_id: Uuid,
    context: ErrorContext,
}

impl ContextLogger {
    pub fn new(scope: &'static str) -> Self {
        Self {
            scope,
            request_id: Uuid::new_v4(),
            context: ErrorContext::default(),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn set_interaction(&mut self, interaction: InteractionSummary) {
        self.context.interaction = Some(interaction);
    }

    pub fn set_handler(&mut self, handler: HandlerSummary) {
        self.context.handler = Some(handler);
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.context.path = Some(path.into());
    }

    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.context.identifier = Some(identifier.into());
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.context.category = Some(category.into());
    }

    /// Build an error for `code` with the current context snapshot
    pub fn error(&self, code: ErrorCode) -> CoreError {
        CoreError::new(code).with_context(self.context.clone())
    }

    /// Enrich an error raised elsewhere with what this logger knows
    pub fn enrich(&self, mut err: CoreError) -> CoreError {
        err.context.merge_missing(&self.context);
        err
    }

    /// Turn any failure into a taxonomy error
    ///
    /// `CoreError`s keep their code; everything else becomes `UnknownError`
    /// with the original text kept as detail.
    pub fn absorb(&self, err: anyhow::Error) -> CoreError {
        match err.downcast::<CoreError>() {
            Ok(core) => self.enrich(core),
            Err(other) => self
                .error(ErrorCode::UnknownError)
                .with_detail(format!("{other:#}")),
        }
    }

    /// Write the error to the log at a level matching its severity
    pub fn report(&self, err: &CoreError) {
        let id = self.request_id;
        let scope = self.scope;
        if !err.loggable {
            debug!("[{id}] {scope}: {err} ({})", err.context);
            return;
        }
        match err.severity {
            Severity::High => error!("[{id}] {scope}: {err} ({})", err.context),
            Severity::Medium => warn!("[{id}] {scope}: {err} ({})", err.context),
            Severity::Low => info!("[{id}] {scope}: {err} ({})", err.context),
        }
    }

    pub fn debug(&self, message: impl fmt::Display) {
        debug!("[{}] {}: {message}", self.request_id, self.scope);
    }
}
