//! # Command System
//!
//! Application command definitions, their publication to Discord, the
//! context shared with handler callbacks, and the built-in action handlers.
//!
//! - **Version**: 3.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Commands published from the Action Registry; handlers become catalog entries
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context;
pub mod definition;
pub mod handlers;
pub mod publish;

pub use context::HandlerContext;
pub use definition::{CommandData, CommandOptionData, OptionChoice, OptionKind};
pub use handlers::create_action_catalog;
pub use publish::{
    build_command, publish_commands, publishable_commands, CommandKind, CommandPublisher,
    PublishedCommand,
};
