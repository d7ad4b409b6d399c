//! # Built-in Event Handlers
//!
//! Event callbacks shipped with the bot, exposed through a registration
//! table that event manifests reference by name.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod lifecycle;
pub mod router;

use std::sync::Arc;

use crate::commands::publish::CommandPublisher;
use crate::dispatch::Dispatcher;
use crate::loader::HandlerCatalog;
use crate::registry::EventCallback;

pub use lifecycle::{
    CacheReadyHandler, GuildJoinHandler, GuildLeaveHandler, ReadyHandler, ResumeHandler,
};
pub use router::InteractionRouter;

/// Catalog names of the built-in event callbacks, sorted
pub const EVENT_HANDLER_NAMES: &[&str] = &[
    "cache-ready",
    "guild-join",
    "guild-leave",
    "interaction-router",
    "ready",
    "resume",
];

/// Registration table of every built-in event callback
pub fn create_event_catalog(
    dispatcher: Arc<Dispatcher>,
    publisher: Arc<dyn CommandPublisher>,
) -> HandlerCatalog<dyn EventCallback> {
    HandlerCatalog::<dyn EventCallback>::new()
        .with("ready", Arc::new(ReadyHandler::new(publisher)))
        .with("cache-ready", Arc::new(CacheReadyHandler))
        .with("interaction-router", Arc::new(InteractionRouter::new(dispatcher)))
        .with("guild-join", Arc::new(GuildJoinHandler))
        .with("guild-leave", Arc::new(GuildLeaveHandler))
        .with("resume", Arc::new(ResumeHandler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::HandlerContext;
    use crate::commands::publish::testing::RecordingPublisher;
    use crate::errors::MessageTable;

    #[tokio::test]
    async fn test_catalog_names() {
        let ctx = HandlerContext::for_tests().await;
        let dispatcher = Arc::new(Dispatcher::new(ctx, Arc::new(MessageTable::builtin())));
        let catalog = create_event_catalog(dispatcher, Arc::new(RecordingPublisher::default()));

        assert_eq!(catalog.names(), EVENT_HANDLER_NAMES.to_vec());
    }
}
