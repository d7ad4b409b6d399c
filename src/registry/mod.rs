//! # Handler Registries
//!
//! In-memory keyed stores of handler records. Two instances exist per
//! process: the Action Registry (interaction handlers) and the Event Registry
//! (gateway lifecycle handlers). Both are built at startup, shared through
//! `Arc`, and never persisted.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod action;
pub mod event;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;

use crate::errors::{CoreError, ErrorCode, HandlerSummary};

pub use action::{Action, ActionCallback, ActionCategory};
pub use event::{Event, EventCallback, EventKind, EventPayload};

/// Registry of interaction handlers, keyed by `<category prefix>-<identifier>`
pub type ActionRegistry = Registry<Action>;

/// Registry of gateway event handlers, keyed by identifier alone
pub type EventRegistry = Registry<Event>;

/// A record that can live in a [`Registry`]
pub trait HandlerRecord: Clone + Send + Sync + 'static {
    type Category: Copy + fmt::Display + Send + Sync;

    /// Singular noun used in logs ("action", "event")
    const NOUN: &'static str;
    const ALREADY_EXISTS: ErrorCode;
    const NOT_FOUND: ErrorCode;
    const DISABLED: ErrorCode;
    const WITHOUT_CALLBACK: ErrorCode;

    fn identifier(&self) -> &str;
    fn category(&self) -> Self::Category;
    fn is_disabled(&self) -> bool;

    /// Key under which a record with this category and identifier is stored
    fn composite_key(category: Self::Category, identifier: &str) -> String;

    fn key(&self) -> String {
        Self::composite_key(self.category(), self.identifier())
    }

    fn summary(&self) -> HandlerSummary {
        HandlerSummary {
            key: self.key(),
            category: self.category().to_string(),
            identifier: self.identifier().to_string(),
            disabled: self.is_disabled(),
        }
    }
}

/// Keyed store of handler records
///
/// All operations are single map operations, so interleaved dispatches see
/// each register/update/remove atomically. A callback must not assume the
/// registry is unchanged across its own await points.
pub struct Registry<R: HandlerRecord> {
    entries: DashMap<String, R>,
}

impl<R: HandlerRecord> Registry<R> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Insert a record under its composite key
    ///
    /// Fails with the record type's "already exists" code when the key is
    /// taken and `force` is false. Disabled records occupy their key like any
    /// other record.
    pub fn register(&self, record: R, force: bool) -> Result<(), CoreError> {
        let key = record.key();
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if !force {
                    return Err(CoreError::new(R::ALREADY_EXISTS)
                        .with_identifier(record.identifier())
                        .with_category(record.category().to_string()));
                }
                occupied.insert(record);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(record);
            }
        }
        Ok(())
    }

    pub fn get(&self, category: R::Category, identifier: &str) -> Option<R> {
        self.get_by_key(&R::composite_key(category, identifier))
    }

    /// Lookup by an already composed key
    pub fn get_by_key(&self, key: &str) -> Option<R> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn has(&self, category: R::Category, identifier: &str) -> bool {
        self.entries
            .contains_key(&R::composite_key(category, identifier))
    }

    /// Replace the record stored under an existing key
    ///
    /// The record keeps the key it was looked up by.
    pub fn update(&self, category: R::Category, identifier: &str, record: R) -> Result<(), CoreError> {
        let key = R::composite_key(category, identifier);
        match self.entries.get_mut(&key) {
            Some(mut entry) => {
                *entry.value_mut() = record;
                Ok(())
            }
            None => Err(CoreError::new(R::NOT_FOUND)
                .with_identifier(identifier)
                .with_category(category.to_string())),
        }
    }

    /// Remove a record; absent keys are ignored
    pub fn remove(&self, category: R::Category, identifier: &str) -> Option<R> {
        self.entries
            .remove(&R::composite_key(category, identifier))
            .map(|(_, record)| record)
    }

    /// Copy of every record, independent of the registry's storage
    pub fn list_all(&self) -> Vec<R> {
        self.entries.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: HandlerRecord> Default for Registry<R> {
    fn default() -> Self {
        Self::new()
    }
}
