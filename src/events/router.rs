//! Interaction routing
//!
//! Handles: interactionCreate

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::HandlerContext;
use crate::dispatch::Dispatcher;
use crate::registry::{EventCallback, EventPayload};

/// Hands every interaction to the [`Dispatcher`]
///
/// Dispatch failures were already reported and replied to by the
/// dispatcher, so they never fail this event handler.
pub struct InteractionRouter {
    dispatcher: Arc<Dispatcher>,
}

impl InteractionRouter {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl EventCallback for InteractionRouter {
    async fn run(&self, _ctx: Arc<HandlerContext>, payload: &EventPayload) -> Result<()> {
        if let EventPayload::InteractionCreate(interaction) = payload {
            let _ = self.dispatcher.dispatch(interaction).await;
        }
        Ok(())
    }
}
