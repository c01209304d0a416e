//! `/ping`.

use crate::framework::{Context, Error};

/// Check that the bot is responsive
#[poise::command(slash_command, category = "Utility")]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(ctx.data().i18n.text("pong-reply")).await?;
    Ok(())
}
