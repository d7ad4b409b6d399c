//! Built-in action handlers
//!
//! - **Version**: 3.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 3.0.0: Handlers are catalog entries referenced by action manifests
//! - 2.0.0: Profile and registry listing handlers
//! - 1.0.0: Initial ping handler

pub mod listing;
pub mod profile;
pub mod utility;

use std::sync::Arc;

use crate::loader::HandlerCatalog;
use crate::registry::ActionCallback;

/// Registration table of every built-in action callback
///
/// Manifests refer to these entries by name through their `handler` field.
pub fn create_action_catalog() -> HandlerCatalog<dyn ActionCallback> {
    HandlerCatalog::<dyn ActionCallback>::new()
        .with("ping", Arc::new(utility::PingHandler))
        .with("profile", Arc::new(profile::ProfileHandler))
        .with("profile-refresh", Arc::new(profile::ProfileRefreshHandler))
        .with("handlers", Arc::new(listing::HandlersListHandler))
        .with("handlers-autocomplete", Arc::new(listing::CategoryAutocomplete))
}
