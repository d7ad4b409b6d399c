//! Event handler records
//!
//! An event handler subscribes to one named gateway event. Identifiers are
//! unique across all event kinds.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::HandlerRecord;
use crate::commands::context::HandlerContext;
use crate::errors::ErrorCode;
use crate::interaction::Interaction;

/// Callback invoked for every delivery of a subscribed event
#[async_trait]
pub trait EventCallback: Send + Sync {
    async fn run(&self, ctx: Arc<HandlerContext>, payload: &EventPayload) -> Result<()>;
}

/// Gateway events handlers can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Ready,
    CacheReady,
    Resume,
    GuildCreate,
    GuildDelete,
    MessageCreate,
    InteractionCreate,
    #[serde(other)]
    Unknown,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Ready => "ready",
            EventKind::CacheReady => "cacheReady",
            EventKind::Resume => "resume",
            EventKind::GuildCreate => "guildCreate",
            EventKind::GuildDelete => "guildDelete",
            EventKind::MessageCreate => "messageCreate",
            EventKind::InteractionCreate => "interactionCreate",
            EventKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Data delivered with a gateway event
#[derive(Debug, Clone)]
pub enum EventPayload {
    Ready {
        user_id: u64,
        user_name: String,
        guild_count: usize,
        shard: Option<[u64; 2]>,
    },
    CacheReady {
        guild_count: usize,
    },
    Resume,
    GuildCreate {
        guild_id: u64,
        name: String,
        member_count: u64,
        is_new: bool,
    },
    GuildDelete {
        guild_id: u64,
        name: Option<String>,
    },
    MessageCreate {
        message_id: u64,
        channel_id: u64,
        guild_id: Option<u64>,
        author_id: u64,
        author_name: String,
        is_bot: bool,
        content: String,
    },
    InteractionCreate(Box<Interaction>),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Ready { .. } => EventKind::Ready,
            EventPayload::CacheReady { .. } => EventKind::CacheReady,
            EventPayload::Resume => EventKind::Resume,
            EventPayload::GuildCreate { .. } => EventKind::GuildCreate,
            EventPayload::GuildDelete { .. } => EventKind::GuildDelete,
            EventPayload::MessageCreate { .. } => EventKind::MessageCreate,
            EventPayload::InteractionCreate(_) => EventKind::InteractionCreate,
        }
    }
}

/// Event handler record
#[derive(Clone)]
pub struct Event {
    pub identifier: String,
    pub kind: EventKind,
    /// Unsubscribe after the first delivery
    pub once: bool,
    pub disabled: bool,
    pub tags: BTreeSet<String>,
    pub callback: Option<Arc<dyn EventCallback>>,
}

impl Event {
    pub fn new(kind: EventKind, identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
            once: false,
            disabled: false,
            tags: BTreeSet::new(),
            callback: None,
        }
    }

    pub fn with_callback(mut self, callback: Arc<dyn EventCallback>) -> Self {
        self.callback = Some(callback);
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

    pub fn once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        let same_callback = match (&self.callback, &other.callback) {
            (Some(a), Some(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (None, None) => true,
            _ => false,
        };
        self.identifier == other.identifier
            && self.kind == other.kind
            && self.once == other.once
            && self.disabled == other.disabled
            && self.tags == other.tags
            && same_callback
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("identifier", &self.identifier)
            .field("kind", &self.kind)
            .field("once", &self.once)
            .field("disabled", &self.disabled)
            .field("tags", &self.tags)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

impl HandlerRecord for Event {
    type Category = EventKind;

    const NOUN: &'static str = "event";
    const ALREADY_EXISTS: ErrorCode = ErrorCode::EventIdentifierAlreadyExists;
    const NOT_FOUND: ErrorCode = ErrorCode::EventNotFound;
    const DISABLED: ErrorCode = ErrorCode::EventDisabled;
    const WITHOUT_CALLBACK: ErrorCode = ErrorCode::EventWithoutCallback;

    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn category(&self) -> EventKind {
        self.kind
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Event identifiers are global; the kind is not part of the key
    fn composite_key(_kind: EventKind, identifier: &str) -> String {
        identifier.to_string()
    }
}
