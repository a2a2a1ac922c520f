//! `/coinflip` and `/guide`

use std::time::Duration;

use chrono::Utc;
use serenity::all::{
    CommandInteraction, Context, CreateCommand, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter,
    CreateInteractionResponse, CreateInteractionResponseMessage, EditInteractionResponse,
};
use tokio::time::sleep;

pub fn coinflip_definition() -> CreateCommand {
    CreateCommand::new("coinflip").description("Flips a virtual coin.")
}

pub fn guide_definition() -> CreateCommand {
    CreateCommand::new("guide").description("Shows the user guide for this bot.")
}

pub async fn run_coinflip(ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
    let flipping = CreateEmbed::new()
        .title("Flipping a coin...")
        .description("🪙 The coin is in the air!")
        .color(0x3498db);
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().embed(flipping),
            ),
        )
        .await?;

    // A beat of suspense before the reveal.
    sleep(Duration::from_millis(1500)).await;

    let heads: bool = rand::random();
    let (result, emoji, color) = if heads {
        ("Heads", "👑", 0xFFD700)
    } else {
        ("Tails", "🪙", 0xC0C0C0)
    };

    let final_embed = CreateEmbed::new()
        .title("Coin Flip Result")
        .description(format!("# {emoji} {result} {emoji}"))
        .color(color)
        .author(
            CreateEmbedAuthor::new(command.user.display_name()).icon_url(command.user.face()),
        )
        .footer(CreateEmbedFooter::new(format!(
            "Flipped at {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        )));
    command
        .edit_response(&ctx.http, EditInteractionResponse::new().embed(final_embed))
        .await?;
    Ok(())
}

pub async fn run_guide(ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
    let bot = ctx.cache.current_user().clone();
    let embed = CreateEmbed::new()
        .title("Bot User Guide")
        .description("Here's how to use the bot's commands:")
        .color(0x3498db)
        .author(CreateEmbedAuthor::new(bot.name.clone()).icon_url(bot.face()))
        .field(
            "👋 Welcome Messages",
            "The bot automatically welcomes new members in a designated channel.",
            false,
        )
        .field(
            "`!report` (Prefix Command)",
            "Use this command to post the team selection dropdowns.",
            false,
        )
        .field(
            "`/teams`",
            "Displays a list of all teams and the members currently assigned to them.",
            false,
        )
        .field(
            "`/purge`",
            "Deletes a specified number of recent messages (you must have 'Manage Messages' permission).",
            false,
        )
        .field(
            "`/content`",
            "Create custom embeds.\n\
             **Example:** `/content title:My Event main_text:Join us!//{{Details}} At 8 PM sharp. color:#DBBE93`\n\
             - `//` creates a new line.\n\
             - `{{Title}} Value` creates a new field.",
            false,
        )
        .field(
            "`/time`",
            "Start a timer for yourself or another user.\n\
             **Example:** `/time duration:1m 30s user:@somebody`\n\
             - Buttons to pause/resume and end the timer.\n\
             - Alerts at 1 minute remaining and when time is up.",
            false,
        )
        .field("`/coinflip`", "Flips a virtual coin and shows the result.", false)
        .footer(CreateEmbedFooter::new("Enjoy using the bot!"));

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .embed(embed)
                    .ephemeral(true),
            ),
        )
        .await
}
