//! # Dispatch
//!
//! Routes inbound stimuli to registered handlers. Interactions go through the
//! [`Dispatcher`]; gateway events fan out through the [`EventBus`] to the
//! handlers the [`EventRouter`] subscribed.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod bus;
pub mod router;

use log::{debug, info, warn};
use std::sync::Arc;

pub use bus::EventBus;
pub use router::EventRouter;

use crate::commands::context::HandlerContext;
use crate::core::truncate_for_message;
use crate::errors::{ContextLogger, CoreError, ErrorCode, MessageTable};
use crate::interaction::Interaction;
use crate::registry::{ActionCategory, ActionRegistry, HandlerRecord};

/// Resolves interactions to actions and runs them under one error envelope
///
/// Every failure, from classification to a panicking callback, is logged and
/// translated into a localized ephemeral reply when the caller can still be
/// answered. Nothing escapes as a crash.
pub struct Dispatcher {
    actions: Arc<ActionRegistry>,
    messages: Arc<MessageTable>,
    context: Arc<HandlerContext>,
}

impl Dispatcher {
    pub fn new(context: Arc<HandlerContext>, messages: Arc<MessageTable>) -> Self {
        Self {
            actions: context.actions.clone(),
            messages,
            context,
        }
    }

    /// Dispatch one interaction
    ///
    /// The returned error has already been reported and, where possible,
    /// replied to; its `message` holds the text resolved for the caller.
    pub async fn dispatch(&self, interaction: &Interaction) -> Result<(), CoreError> {
        let mut logger = ContextLogger::new("dispatcher");
        logger.set_interaction(interaction.summary());

        match self.run(&mut logger, interaction).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.fail(&logger, interaction, err).await),
        }
    }

    async fn run(&self, logger: &mut ContextLogger, interaction: &Interaction) -> Result<(), CoreError> {
        let category = ActionCategory::classify(&interaction.kind)
            .ok_or_else(|| logger.error(ErrorCode::UnsupportedInteractionType))?;
        logger.set_category(category.to_string());

        let identifier = interaction
            .identifier()
            .ok_or_else(|| logger.error(ErrorCode::ActionNotFound))?;
        logger.set_identifier(identifier);

        let action = self
            .actions
            .get(category, identifier)
            .ok_or_else(|| logger.error(ErrorCode::ActionNotFound))?;
        logger.set_handler(action.summary());

        if action.disabled {
            return Err(logger.error(ErrorCode::ActionDisabled));
        }
        let callback = action
            .callback
            .ok_or_else(|| logger.error(ErrorCode::ActionWithoutCallback))?;

        info!(
            "[{}] ⚡ Dispatching {} to {}",
            logger.request_id(),
            interaction.kind.label(),
            action.identifier
        );

        // Spawned so a panicking callback surfaces as a JoinError
        let ctx = self.context.clone();
        let owned = interaction.clone();
        let handle = tokio::spawn(async move { callback.run(ctx, &owned).await });

        match handle.await {
            Ok(Ok(())) => {
                logger.debug("callback completed");
                Ok(())
            }
            Ok(Err(e)) => Err(logger.absorb(e)),
            Err(join_error) => Err(logger
                .error(ErrorCode::UnknownError)
                .with_detail(format!("callback aborted: {join_error}"))),
        }
    }

    async fn fail(&self, logger: &ContextLogger, interaction: &Interaction, err: CoreError) -> CoreError {
        let mut err = logger.enrich(err);
        logger.report(&err);

        let text = self
            .messages
            .resolve(err.code, &interaction.locale, &err.context);
        err.message = truncate_for_message(&text);

        if !interaction.is_repliable() {
            debug!(
                "[{}] Interaction not repliable, dropping {}",
                logger.request_id(),
                err.code
            );
            return err;
        }

        if let Err(e) = interaction.reply_ephemeral(&err.message).await {
            warn!(
                "[{}] Failed to send error reply for {}: {e}",
                logger.request_id(),
                err.code
            );
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::testing::{command, RecordingResponder};
    use crate::interaction::InteractionKind;
    use crate::registry::action::testing::noop_action;
    use crate::registry::{Action, ActionCallback};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Pong;

    #[async_trait]
    impl ActionCallback for Pong {
        async fn run(&self, _ctx: Arc<HandlerContext>, interaction: &Interaction) -> Result<()> {
            interaction.reply("Pong!").await
        }
    }

    #[derive(Default)]
    struct Spy {
        calls: AtomicUsize,
        seen: Mutex<Vec<InteractionKind>>,
    }

    #[async_trait]
    impl ActionCallback for Spy {
        async fn run(&self, _ctx: Arc<HandlerContext>, interaction: &Interaction) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(interaction.kind.clone());
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl ActionCallback for Failing {
        async fn run(&self, _ctx: Arc<HandlerContext>, _interaction: &Interaction) -> Result<()> {
            anyhow::bail!("database unavailable")
        }
    }

    struct Raising;

    #[async_trait]
    impl ActionCallback for Raising {
        async fn run(&self, _ctx: Arc<HandlerContext>, _interaction: &Interaction) -> Result<()> {
            Err(CoreError::new(ErrorCode::EventNotFound).into())
        }
    }

    struct Panicking;

    #[async_trait]
    impl ActionCallback for Panicking {
        async fn run(&self, _ctx: Arc<HandlerContext>, _interaction: &Interaction) -> Result<()> {
            panic!("handler bug");
        }
    }

    async fn dispatcher(messages: MessageTable) -> Dispatcher {
        Dispatcher::new(HandlerContext::for_tests().await, Arc::new(messages))
    }

    fn interaction(kind: InteractionKind) -> (Interaction, Arc<RecordingResponder>) {
        let responder = Arc::new(RecordingResponder::default());
        let interaction = Interaction::new(kind).with_responder(responder.clone());
        (interaction, responder)
    }

    #[tokio::test]
    async fn test_ping_end_to_end() {
        let dispatcher = dispatcher(MessageTable::builtin()).await;
        dispatcher
            .actions
            .register(Action::new(ActionCategory::Command, "ping").with_callback(Arc::new(Pong)), false)
            .unwrap();

        let (interaction, responder) = interaction(command("ping"));
        dispatcher.dispatch(&interaction).await.unwrap();

        assert_eq!(responder.replies(), vec![("Pong!".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_missing_end_to_end_replies_in_locale() {
        let mut messages = MessageTable::empty();
        messages.set_default(ErrorCode::ActionNotFound, "Not found.");
        messages.set_locale(ErrorCode::ActionNotFound, "fr", "Introuvable.");
        let dispatcher = dispatcher(messages).await;

        let (interaction, responder) = interaction(command("missing"));
        let interaction = interaction.with_locale("fr");
        let err = dispatcher.dispatch(&interaction).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ActionNotFound);
        assert_eq!(err.message, "Introuvable.");
        assert_eq!(responder.replies(), vec![("Introuvable.".to_string(), true)]);
    }

    #[tokio::test]
    async fn test_callback_invoked_once_with_original_stimulus() {
        let dispatcher = dispatcher(MessageTable::builtin()).await;
        let spy = Arc::new(Spy::default());
        dispatcher
            .actions
            .register(Action::new(ActionCategory::Button, "confirm").with_callback(spy.clone()), false)
            .unwrap();

        let kind = InteractionKind::Button {
            custom_id: "confirm".to_string(),
        };
        let (interaction, _) = interaction(kind.clone());
        dispatcher.dispatch(&interaction).await.unwrap();

        assert_eq!(spy.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*spy.seen.lock().unwrap(), vec![kind]);
    }

    #[tokio::test]
    async fn test_same_identifier_other_category_is_not_found() {
        let dispatcher = dispatcher(MessageTable::builtin()).await;
        dispatcher
            .actions
            .register(noop_action(ActionCategory::Button, "ping"), false)
            .unwrap();

        let (interaction, _) = interaction(command("ping"));
        let err = dispatcher.dispatch(&interaction).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ActionNotFound);
    }

    #[tokio::test]
    async fn test_unsupported_interaction() {
        let dispatcher = dispatcher(MessageTable::builtin()).await;
        let ping = Interaction::new(InteractionKind::Unsupported {
            kind: "ping".to_string(),
        });

        let err = dispatcher.dispatch(&ping).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedInteractionType);
    }

    #[tokio::test]
    async fn test_unsupported_component_still_gets_a_reply() {
        let mut messages = MessageTable::empty();
        messages.set_default(ErrorCode::UnsupportedInteractionType, "Not supported.");
        let dispatcher = dispatcher(messages).await;
        let (interaction, responder) = interaction(InteractionKind::Unsupported {
            kind: "component-99".to_string(),
        });

        let err = dispatcher.dispatch(&interaction).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::UnsupportedInteractionType);
        assert_eq!(responder.replies(), vec![("Not supported.".to_string(), true)]);
    }

    #[tokio::test]
    async fn test_disabled_never_invoked() {
        let dispatcher = dispatcher(MessageTable::builtin()).await;
        let spy = Arc::new(Spy::default());
        dispatcher
            .actions
            .register(
                Action::new(ActionCategory::Command, "legacy")
                    .with_callback(spy.clone())
                    .disabled(true),
                false,
            )
            .unwrap();

        let (interaction, responder) = interaction(command("legacy"));
        let err = dispatcher.dispatch(&interaction).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ActionDisabled);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
        assert_eq!(responder.replies().len(), 1);
        assert!(responder.replies()[0].1);
    }

    #[tokio::test]
    async fn test_without_callback() {
        let dispatcher = dispatcher(MessageTable::builtin()).await;
        dispatcher
            .actions
            .register(Action::new(ActionCategory::Command, "hollow"), false)
            .unwrap();

        let (interaction, _) = interaction(command("hollow"));
        let err = dispatcher.dispatch(&interaction).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ActionWithoutCallback);
        assert_eq!(err.context.handler.as_ref().unwrap().key, "command-hollow");
    }

    #[tokio::test]
    async fn test_callback_error_becomes_unknown_error() {
        let mut messages = MessageTable::empty();
        messages.set_default(ErrorCode::UnknownError, "Something broke.");
        let dispatcher = dispatcher(messages).await;
        dispatcher
            .actions
            .register(Action::new(ActionCategory::Command, "flaky").with_callback(Arc::new(Failing)), false)
            .unwrap();

        let (interaction, responder) = interaction(command("flaky"));
        let err = dispatcher.dispatch(&interaction).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::UnknownError);
        assert!(err.context.detail.as_deref().unwrap().contains("database unavailable"));
        assert_eq!(responder.replies(), vec![("Something broke.".to_string(), true)]);
    }

    #[tokio::test]
    async fn test_callback_core_error_keeps_code() {
        let dispatcher = dispatcher(MessageTable::builtin()).await;
        dispatcher
            .actions
            .register(Action::new(ActionCategory::Command, "raise").with_callback(Arc::new(Raising)), false)
            .unwrap();

        let (interaction, _) = interaction(command("raise"));
        let err = dispatcher.dispatch(&interaction).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::EventNotFound);
        assert_eq!(err.context.identifier.as_deref(), Some("raise"));
    }

    #[tokio::test]
    async fn test_panicking_callback_is_contained() {
        let dispatcher = dispatcher(MessageTable::builtin()).await;
        dispatcher
            .actions
            .register(Action::new(ActionCategory::Command, "boom").with_callback(Arc::new(Panicking)), false)
            .unwrap();

        let (interaction, responder) = interaction(command("boom"));
        let err = dispatcher.dispatch(&interaction).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::UnknownError);
        assert_eq!(responder.replies().len(), 1);
    }

    #[tokio::test]
    async fn test_closed_channel_is_not_replied_to() {
        let dispatcher = dispatcher(MessageTable::builtin()).await;
        let responder = Arc::new(RecordingResponder::closed());
        let interaction = Interaction::new(command("missing")).with_responder(responder.clone());

        let err = dispatcher.dispatch(&interaction).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ActionNotFound);
        assert!(responder.replies().is_empty());
    }

    #[tokio::test]
    async fn test_empty_identifier_is_not_found() {
        let dispatcher = dispatcher(MessageTable::builtin()).await;
        let (interaction, _) = interaction(InteractionKind::Button {
            custom_id: String::new(),
        });

        let err = dispatcher.dispatch(&interaction).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ActionNotFound);
    }

    #[tokio::test]
    async fn test_long_error_text_is_truncated() {
        let mut messages = MessageTable::empty();
        messages.set_default(ErrorCode::ActionNotFound, "x".repeat(5000).as_str());
        let dispatcher = dispatcher(messages).await;

        let (interaction, responder) = interaction(command("missing"));
        dispatcher.dispatch(&interaction).await.unwrap_err();

        assert!(responder.replies()[0].0.chars().count() <= crate::core::MESSAGE_LIMIT);
    }
}
