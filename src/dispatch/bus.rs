//! Event bus
//!
//! Fans gateway events out to subscribed event handlers. Deliveries for one
//! event run sequentially in subscription order; a failing or panicking
//! handler is logged and never stops delivery to the others.

use dashmap::DashMap;
use log::debug;
use std::sync::Arc;

use crate::commands::context::HandlerContext;
use crate::errors::{ContextLogger, ErrorCode};
use crate::registry::{Event, EventCallback, EventKind, EventPayload};

#[derive(Clone)]
struct Subscription {
    identifier: String,
    once: bool,
    callback: Arc<dyn EventCallback>,
}

pub struct EventBus {
    subscribers: DashMap<EventKind, Vec<Subscription>>,
    context: Arc<HandlerContext>,
}

impl EventBus {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self {
            subscribers: DashMap::new(),
            context,
        }
    }

    /// Subscribe an event handler to its event kind
    ///
    /// Re-subscribing an identifier replaces the earlier subscription.
    /// Returns false when the record has no callback.
    pub fn subscribe(&self, event: &Event) -> bool {
        let Some(callback) = event.callback.clone() else {
            return false;
        };
        self.unsubscribe(&event.identifier);
        self.subscribers
            .entry(event.kind)
            .or_default()
            .push(Subscription {
                identifier: event.identifier.clone(),
                once: event.once,
                callback,
            });
        debug!("📡 Subscribed {} to {}", event.identifier, event.kind);
        true
    }

    /// Remove the subscription for `identifier`, whatever its kind
    pub fn unsubscribe(&self, identifier: &str) -> bool {
        let mut removed = false;
        for mut entry in self.subscribers.iter_mut() {
            let before = entry.len();
            entry.retain(|s| s.identifier != identifier);
            removed |= entry.len() != before;
        }
        removed
    }

    pub fn is_subscribed(&self, identifier: &str) -> bool {
        self.subscribers
            .iter()
            .any(|entry| entry.iter().any(|s| s.identifier == identifier))
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map(|s| s.len()).unwrap_or(0)
    }

    /// Deliver an event to every subscriber of its kind
    ///
    /// Returns the number of handlers that completed without error.
    pub async fn emit(&self, payload: EventPayload) -> usize {
        let kind = payload.kind();
        let deliveries = self.take_deliveries(kind);
        if deliveries.is_empty() {
            return 0;
        }

        let payload = Arc::new(payload);
        let mut delivered = 0;

        for subscription in deliveries {
            let mut logger = ContextLogger::new("event-bus");
            logger.set_identifier(subscription.identifier.as_str());
            logger.set_category(kind.name());

            let ctx = self.context.clone();
            let payload = payload.clone();
            let callback = subscription.callback.clone();
            let handle = tokio::spawn(async move { callback.run(ctx, &payload).await });

            match handle.await {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => logger.report(&logger.absorb(e)),
                Err(join_error) => logger.report(
                    &logger
                        .error(ErrorCode::UnknownError)
                        .with_detail(format!("event handler aborted: {join_error}")),
                ),
            }
        }

        delivered
    }

    /// Snapshot the subscribers for `kind`, dropping `once` subscriptions
    ///
    /// The guard is released before any handler runs, so handlers may
    /// subscribe or unsubscribe freely.
    fn take_deliveries(&self, kind: EventKind) -> Vec<Subscription> {
        let Some(mut entry) = self.subscribers.get_mut(&kind) else {
            return Vec::new();
        };
        let snapshot = entry.clone();
        entry.retain(|s| !s.once);
        snapshot
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self
            .subscribers
            .iter()
            .flat_map(|entry| entry.iter().map(|s| s.identifier.clone()).collect::<Vec<_>>())
            .collect();
        keys.sort();
        f.debug_struct("EventBus").field("subscribers", &keys).finish()
    }
}
