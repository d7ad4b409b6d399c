//! Event listener registration
//!
//! Connects Event Registry entries to the [`EventBus`]. `listen` applies the
//! same checks dispatch applies to actions: the handler must exist, be
//! enabled and carry a callback.

use log::info;
use std::sync::Arc;

use super::bus::EventBus;
use crate::errors::{ContextLogger, CoreError, ErrorCode};
use crate::registry::{Event, EventRegistry, HandlerRecord};

pub struct EventRouter {
    events: Arc<EventRegistry>,
    bus: Arc<EventBus>,
}

impl EventRouter {
    pub fn new(events: Arc<EventRegistry>, bus: Arc<EventBus>) -> Self {
        Self { events, bus }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Subscribe the event handler registered under `identifier`
    pub fn listen(&self, identifier: &str) -> Result<(), CoreError> {
        let mut logger = ContextLogger::new("event-router");
        let event = self.resolve(&mut logger, identifier)?;

        if event.disabled {
            return Err(logger.error(ErrorCode::EventDisabled));
        }
        if !self.bus.subscribe(&event) {
            return Err(logger.error(ErrorCode::EventWithoutCallback));
        }

        logger.debug(format_args!("listening on {}", event.kind));
        Ok(())
    }

    /// Unsubscribe the event handler registered under `identifier`
    ///
    /// Muting a handler that is not currently subscribed is a no-op.
    pub fn mute(&self, identifier: &str) -> Result<(), CoreError> {
        let mut logger = ContextLogger::new("event-router");
        let event = self.resolve(&mut logger, identifier)?;

        if event.callback.is_none() {
            return Err(logger.error(ErrorCode::EventWithoutCallback));
        }
        if self.bus.unsubscribe(&event.identifier) {
            logger.debug(format_args!("muted on {}", event.kind));
        }
        Ok(())
    }

    /// Subscribe every enabled handler in the registry
    ///
    /// Disabled handlers are skipped. Handlers that cannot be subscribed are
    /// returned instead of aborting the rest.
    pub fn listen_all(&self) -> Vec<CoreError> {
        let mut failures = Vec::new();
        let mut listening = 0;

        for event in self.snapshot() {
            if event.disabled {
                continue;
            }
            match self.listen(&event.identifier) {
                Ok(()) => listening += 1,
                Err(err) => {
                    ContextLogger::new("event-router").report(&err);
                    failures.push(err);
                }
            }
        }

        info!(
            "📡 Listening to {listening} event handler(s), {} failed",
            failures.len()
        );
        failures
    }

    /// Unsubscribe every handler in the registry
    pub fn mute_all(&self) -> Vec<CoreError> {
        self.snapshot()
            .iter()
            .filter_map(|event| self.mute(&event.identifier).err())
            .collect()
    }

    fn resolve(&self, logger: &mut ContextLogger, identifier: &str) -> Result<Event, CoreError> {
        logger.set_identifier(identifier);
        let event = self
            .events
            .get_by_key(identifier)
            .ok_or_else(|| logger.error(ErrorCode::EventNotFound))?;
        logger.set_handler(event.summary());
        Ok(event)
    }

    fn snapshot(&self) -> Vec<Event> {
        let mut events = self.events.list_all();
        events.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        events
    }
}
