// Core layer - configuration and reply limits
pub mod core;

// Error taxonomy, localized messages, context logging
pub mod errors;

// Stimulus model and handler registries
pub mod interaction;
pub mod registry;

// Handler discovery and routing
pub mod dispatch;
pub mod loader;

// Built-in handlers and command publication
pub mod commands;
pub mod events;

// Infrastructure
pub mod database;
pub mod gateway;

pub use core::Config;
pub use dispatch::{Dispatcher, EventBus, EventRouter};
pub use errors::{CoreError, ErrorCode, MessageTable};
pub use interaction::{Interaction, InteractionKind};
pub use loader::{FolderLoader, HandlerCatalog, LoadFailure};
pub use registry::{Action, ActionRegistry, Event, EventRegistry};
