//! Confirm/cancel button prompts for destructive commands.

use crate::framework::{Context, Error};
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use std::time::Duration;

/// An ephemeral embed with Confirm and Cancel buttons.
pub(crate) struct ConfirmPrompt {
    pub embed: serenity::CreateEmbed,
    pub confirm_label: String,
    pub cancel_label: String,
    pub timeout: Duration,
    /// Replaces the prompt when nobody answers in time.
    pub timed_out: String,
}

/// How the invoking user answered.
pub(crate) enum Answer {
    Confirmed(serenity::ComponentInteraction),
    Cancelled(serenity::ComponentInteraction),
    TimedOut,
}

/// Shows `prompt` and waits for the invoking user to press a button.
///
/// Buttons carry the invocation id, so presses on another prompt are ignored.
pub(crate) async fn ask(ctx: Context<'_>, prompt: ConfirmPrompt) -> Result<Answer, Error> {
    let prefix = format!("{}:", ctx.id());
    let confirm_id = format!("{prefix}confirm");
    let cancel_id = format!("{prefix}cancel");

    let buttons = serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(&confirm_id)
            .label(prompt.confirm_label)
            .style(serenity::ButtonStyle::Danger),
        serenity::CreateButton::new(&cancel_id)
            .label(prompt.cancel_label)
            .style(serenity::ButtonStyle::Secondary),
    ]);

    let reply = ctx
        .send(
            CreateReply::default()
                .embed(prompt.embed)
                .components(vec![buttons])
                .ephemeral(true),
        )
        .await?;

    let press = serenity::ComponentInteractionCollector::new(ctx.serenity_context())
        .author_id(ctx.author().id)
        .channel_id(ctx.channel_id())
        .timeout(prompt.timeout)
        .filter(move |press| press.data.custom_id.starts_with(&prefix))
        .await;

    let Some(press) = press else {
        reply
            .edit(
                ctx,
                CreateReply::default()
                    .content(prompt.timed_out)
                    .components(Vec::new()),
            )
            .await?;
        return Ok(Answer::TimedOut);
    };

    if press.data.custom_id == confirm_id {
        Ok(Answer::Confirmed(press))
    } else {
        Ok(Answer::Cancelled(press))
    }
}

/// Replaces the prompt answered by `press` with plain `text`.
pub(crate) async fn settle(
    ctx: Context<'_>,
    press: &serenity::ComponentInteraction,
    text: String,
) -> Result<(), Error> {
    press
        .create_response(
            ctx.serenity_context(),
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .content(text)
                    .embeds(Vec::new())
                    .components(Vec::new()),
            ),
        )
        .await?;
    Ok(())
}
