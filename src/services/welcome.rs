//! New-member welcome flow and the banner compositor boundary

use std::sync::Arc;

use serenity::all::{
    ChannelId, Context, CreateAttachment, CreateEmbed, CreateEmbedFooter, CreateMessage, Member,
    Mentionable, Timestamp,
};
use tracing::{debug, error, warn};

use crate::render::COMMUNITY_COLOR;
use crate::state::AppState;

const BANNER_FILENAME: &str = "welcome_banner.png";

/// Composes a personalized welcome banner PNG from a member's display name
/// and avatar image bytes.
///
/// Compositing itself lives outside this crate; implementations are plugged
/// into [`AppState::banner`]. When no composer is configured, or composing
/// fails, the welcome message falls back to the plain embed.
pub trait BannerComposer: Send + Sync {
    fn compose(&self, display_name: &str, avatar_png: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// Greets a new member in the configured welcome channel.
pub async fn greet(ctx: &Context, state: &Arc<AppState>, member: &Member) {
    let channel = ChannelId::new(state.settings.welcome_channel);

    let (guild_name, guild_icon) = match member.guild_id.to_partial_guild(&ctx.http).await {
        Ok(guild) => (guild.name.clone(), guild.icon_url()),
        Err(e) => {
            debug!("Could not fetch guild for welcome footer: {}", e);
            (String::new(), None)
        }
    };

    let mut embed = welcome_embed(member, &guild_name, guild_icon);
    let mut message = CreateMessage::new();

    if let Some(banner) = banner_attachment(state, member).await {
        message = message.add_file(banner);
        embed = embed.image(format!("attachment://{BANNER_FILENAME}"));
    }

    if let Err(e) = channel.send_message(&ctx.http, message.embed(embed)).await {
        error!(
            "Failed to send welcome message for {} to channel {}: {}",
            member.user.name, channel, e
        );
    }
}

fn welcome_embed(member: &Member, guild_name: &str, guild_icon: Option<String>) -> CreateEmbed {
    let description = format!(
        "**We warmly welcome our newest voice {}**\n\n\
         Your voice, ideas, and passion for reasoning are now part of our mission to foster \
         thoughtful dialogue and intellectual growth.\n\n\
         We believe your presence will contribute to the growth of debate and enrich our \
         round-table discussions. ✨",
        member.mention()
    );

    let mut footer = CreateEmbedFooter::new(guild_name.to_string());
    if let Some(icon) = guild_icon {
        footer = footer.icon_url(icon);
    }

    CreateEmbed::new()
        .title("🏛️ Opening the Floor to Our Newest Voice")
        .description(description)
        .color(COMMUNITY_COLOR)
        .timestamp(Timestamp::now())
        .thumbnail(member.face())
        .footer(footer)
}

/// Runs the configured compositor against the member's avatar. Every failure
/// path degrades to `None` so the welcome embed still goes out bannerless.
async fn banner_attachment(state: &Arc<AppState>, member: &Member) -> Option<CreateAttachment> {
    let composer = state.banner.as_ref()?;

    let avatar = match download_avatar(&member.face()).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(
                "Could not download avatar for {}: {}",
                member.user.name, e
            );
            return None;
        }
    };

    match composer.compose(member.display_name(), &avatar) {
        Ok(png) => Some(CreateAttachment::bytes(png, BANNER_FILENAME)),
        Err(e) => {
            warn!(
                "Banner composition failed for {}: {}",
                member.user.name, e
            );
            None
        }
    }
}

async fn download_avatar(url: &str) -> reqwest::Result<Vec<u8>> {
    let response = reqwest::get(url).await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}
