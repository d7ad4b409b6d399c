//! # Core Module
//!
//! Process configuration and outbound reply limits.
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Configuration for manifest directories, sharding and publication
//! - 1.1.0: Add response module with Discord message limits
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod response;

pub use config::Config;
pub use response::{clamp_choices, truncate_for_message, truncate_to, MESSAGE_LIMIT};
