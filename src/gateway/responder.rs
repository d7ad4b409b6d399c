//! Reply capability over serenity's HTTP client

use anyhow::{bail, Result};
use async_trait::async_trait;
use log::debug;
use serenity::builder::{CreateComponents, CreateInteractionResponse};
use serenity::http::Http;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::autocomplete::AutocompleteInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::modal::ModalSubmitInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::{clamp_choices, truncate_for_message};
use crate::interaction::{InteractionResponder, ReplyButton};

/// How long Discord accepts responses for an interaction token
const TOKEN_LIFETIME: Duration = Duration::from_secs(15 * 60);

enum Target {
    Command(ApplicationCommandInteraction),
    Component(MessageComponentInteraction),
    Modal(ModalSubmitInteraction),
    Autocomplete(AutocompleteInteraction),
}

pub struct SerenityResponder {
    http: Arc<Http>,
    target: Target,
    received: Instant,
    /// Set once the initial response was created; later replies are followups
    responded: AtomicBool,
}

impl SerenityResponder {
    fn new(http: Arc<Http>, target: Target) -> Self {
        Self {
            http,
            target,
            received: Instant::now(),
            responded: AtomicBool::new(false),
        }
    }

    pub fn command(http: Arc<Http>, interaction: ApplicationCommandInteraction) -> Self {
        Self::new(http, Target::Command(interaction))
    }

    pub fn component(http: Arc<Http>, interaction: MessageComponentInteraction) -> Self {
        Self::new(http, Target::Component(interaction))
    }

    pub fn modal(http: Arc<Http>, interaction: ModalSubmitInteraction) -> Self {
        Self::new(http, Target::Modal(interaction))
    }

    pub fn autocomplete(http: Arc<Http>, interaction: AutocompleteInteraction) -> Self {
        Self::new(http, Target::Autocomplete(interaction))
    }

    async fn create_response(
        &self,
        content: &str,
        ephemeral: bool,
        buttons: &[ReplyButton],
    ) -> serenity::Result<()> {
        let http = &self.http;
        match &self.target {
            Target::Command(i) => {
                i.create_interaction_response(http, |r| {
                    message_response(r, content, ephemeral, buttons)
                })
                .await
            }
            Target::Component(i) => {
                i.create_interaction_response(http, |r| {
                    message_response(r, content, ephemeral, buttons)
                })
                .await
            }
            Target::Modal(i) => {
                i.create_interaction_response(http, |r| {
                    message_response(r, content, ephemeral, buttons)
                })
                .await
            }
            Target::Autocomplete(_) => Err(serenity::Error::Other(
                "autocomplete interactions cannot receive messages",
            )),
        }
    }

    async fn create_followup(
        &self,
        content: &str,
        ephemeral: bool,
        buttons: &[ReplyButton],
    ) -> Result<()> {
        let http = &self.http;
        let components = button_rows(buttons);
        match &self.target {
            Target::Command(i) => {
                i.create_followup_message(http, |f| {
                    f.content(content).ephemeral(ephemeral).set_components(components)
                })
                .await?;
            }
            Target::Component(i) => {
                i.create_followup_message(http, |f| {
                    f.content(content).ephemeral(ephemeral).set_components(components)
                })
                .await?;
            }
            Target::Modal(i) => {
                i.create_followup_message(http, |f| {
                    f.content(content).ephemeral(ephemeral).set_components(components)
                })
                .await?;
            }
            Target::Autocomplete(_) => bail!("autocomplete interactions cannot receive messages"),
        }
        Ok(())
    }
}

fn message_response<'a, 'b>(
    response: &'b mut CreateInteractionResponse<'a>,
    content: &str,
    ephemeral: bool,
    buttons: &[ReplyButton],
) -> &'b mut CreateInteractionResponse<'a> {
    response
        .kind(InteractionResponseType::ChannelMessageWithSource)
        .interaction_response_data(|message| {
            message
                .content(content)
                .ephemeral(ephemeral)
                .set_components(button_rows(buttons))
        })
}

/// Discord allows five buttons per action row
const BUTTONS_PER_ROW: usize = 5;

fn button_rows(buttons: &[ReplyButton]) -> CreateComponents {
    let mut components = CreateComponents::default();
    for row_buttons in buttons.chunks(BUTTONS_PER_ROW) {
        components.create_action_row(|row| {
            for button in row_buttons {
                row.create_button(|b| {
                    b.custom_id(&button.custom_id)
                        .label(&button.label)
                        .style(ButtonStyle::Secondary)
                });
            }
            row
        });
    }
    components
}

#[async_trait]
impl InteractionResponder for SerenityResponder {
    fn is_repliable(&self) -> bool {
        !matches!(self.target, Target::Autocomplete(_)) && self.received.elapsed() < TOKEN_LIFETIME
    }

    async fn reply(&self, content: &str, ephemeral: bool, buttons: &[ReplyButton]) -> Result<()> {
        let content = truncate_for_message(content);

        if !self.responded.swap(true, Ordering::SeqCst) {
            match self.create_response(&content, ephemeral, buttons).await {
                Ok(()) => return Ok(()),
                // Acknowledged elsewhere; fall through to a followup
                Err(e) => debug!("Initial response failed, sending followup: {e}"),
            }
        }
        self.create_followup(&content, ephemeral, buttons).await
    }

    async fn autocomplete(&self, choices: Vec<(String, String)>) -> Result<()> {
        let Target::Autocomplete(interaction) = &self.target else {
            bail!("only autocomplete interactions accept choices");
        };
        let choices = clamp_choices(choices);
        interaction
            .create_autocomplete_response(&self.http, |response| {
                for (name, value) in choices {
                    response.add_string_choice(name, value);
                }
                response
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_rows_split_at_five() {
        let buttons: Vec<ReplyButton> = (0..7)
            .map(|i| ReplyButton::new(format!("b{i}"), format!("B{i}")))
            .collect();
        let components = button_rows(&buttons);

        assert_eq!(components.0.len(), 2);
        let first = components.0[0].get("components").unwrap().as_array().unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].get("custom_id").unwrap().as_str().unwrap(), "b0");
    }

    #[test]
    fn test_no_buttons_no_rows() {
        assert!(button_rows(&[]).0.is_empty());
    }
}
