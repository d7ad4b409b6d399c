//! Handler manifests
//!
//! A manifest file's top-level mapping is the handler it defines. Manifests
//! are YAML (JSON is accepted too, being a subset).
//!
//! ```yaml
//! category: command
//! handler: ping
//! tags: [utility]
//! data:
//!   name: ping
//!   description: Replies with Pong!
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::catalog::HandlerCatalog;
use crate::commands::definition::CommandData;
use crate::errors::{CoreError, ErrorCode};
use crate::registry::{
    Action, ActionCallback, ActionCategory, Event, EventCallback, EventKind, HandlerRecord,
};

/// A record type that can be built from a manifest
pub trait FromManifest: HandlerRecord + Sized {
    type Manifest: DeserializeOwned + Send;
    type Callback: ?Sized + Send + Sync;

    fn manifest_disabled(manifest: &Self::Manifest) -> bool;

    /// Build the record, resolving its `handler` name through `catalog`
    fn from_manifest(
        manifest: Self::Manifest,
        catalog: &HandlerCatalog<Self::Callback>,
    ) -> Result<Self, CoreError>;
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionManifest {
    /// Defaults to `data.name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    pub category: ActionCategory,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CommandData>,

    /// Catalog name of the callback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventManifest {
    pub identifier: String,

    pub event: EventKind,

    #[serde(default)]
    pub once: bool,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
}

fn resolve_callback<C: ?Sized>(
    handler: Option<&str>,
    catalog: &HandlerCatalog<C>,
    missing: ErrorCode,
    identifier: &str,
) -> Result<Option<std::sync::Arc<C>>, CoreError> {
    match handler {
        None => Ok(None),
        Some(name) => catalog.get(name).map(Some).ok_or_else(|| {
            CoreError::new(missing)
                .with_identifier(identifier)
                .with_detail(format!("no handler named '{name}' is compiled in"))
        }),
    }
}

impl FromManifest for Action {
    type Manifest = ActionManifest;
    type Callback = dyn ActionCallback;

    fn manifest_disabled(manifest: &ActionManifest) -> bool {
        manifest.disabled
    }

    fn from_manifest(
        manifest: ActionManifest,
        catalog: &HandlerCatalog<dyn ActionCallback>,
    ) -> Result<Self, CoreError> {
        let identifier = manifest
            .identifier
            .clone()
            .or_else(|| manifest.data.as_ref().map(|d| d.name.clone()))
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                CoreError::new(ErrorCode::NoDefaultExport)
                    .with_detail("manifest has no identifier and no data.name")
            })?;

        // Discord sends commands back by their published name
        if manifest.category.is_command_shaped() {
            if let Some(data) = &manifest.data {
                if data.name != identifier {
                    return Err(CoreError::new(ErrorCode::NoDefaultExport)
                        .with_identifier(identifier.as_str())
                        .with_category(manifest.category.name())
                        .with_detail(format!(
                            "command identifier '{identifier}' differs from data.name '{}'",
                            data.name
                        )));
                }
            }
        }

        let callback = resolve_callback(
            manifest.handler.as_deref(),
            catalog,
            ErrorCode::ActionWithoutCallback,
            &identifier,
        )?;

        Ok(Action {
            identifier,
            category: manifest.category,
            disabled: manifest.disabled,
            tags: manifest.tags,
            data: manifest.data,
            callback,
        })
    }
}

impl FromManifest for Event {
    type Manifest = EventManifest;
    type Callback = dyn EventCallback;

    fn manifest_disabled(manifest: &EventManifest) -> bool {
        manifest.disabled
    }

    fn from_manifest(
        manifest: EventManifest,
        catalog: &HandlerCatalog<dyn EventCallback>,
    ) -> Result<Self, CoreError> {
        if manifest.identifier.trim().is_empty() {
            return Err(CoreError::new(ErrorCode::NoDefaultExport)
                .with_detail("manifest has an empty identifier"));
        }

        let callback = resolve_callback(
            manifest.handler.as_deref(),
            catalog,
            ErrorCode::EventWithoutCallback,
            &manifest.identifier,
        )?;

        Ok(Event {
            identifier: manifest.identifier,
            kind: manifest.event,
            once: manifest.once,
            disabled: manifest.disabled,
            tags: manifest.tags,
            callback,
        })
    }
}
