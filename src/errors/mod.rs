//! # Errors
//!
//! Error taxonomy, localized user-facing messages and the context logger.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod code;
pub mod context;
pub mod messages;

pub use code::{ErrorCode, Severity};
pub use context::{ContextLogger, CoreError, ErrorContext, HandlerSummary, InteractionSummary};
pub use messages::{MessageTable, MessageText};
