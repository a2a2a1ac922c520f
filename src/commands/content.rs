//! `/content` — ad-hoc rich announcement embeds

use serenity::all::{
    Attachment, CommandInteraction, CommandOptionType, Context, CreateAttachment, CreateCommand,
    CreateCommandOption, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter,
    CreateInteractionResponseFollowup, ResolvedValue, Timestamp,
};
use tracing::{debug, warn};

use crate::render::COMMUNITY_COLOR;

pub fn definition() -> CreateCommand {
    CreateCommand::new("content")
        .description("Create a custom embed message.")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "title", "The title of the embed.")
                .required(true),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "main_text",
                "The main text. Use // for line breaks and {{Title}} Text for fields.",
            )
            .required(true),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::String,
            "color",
            "The color of the embed in hex format (e.g., #DBBE93).",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::Attachment,
            "image",
            "Optional main image attachment.",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::Attachment,
            "thumbnail",
            "Optional thumbnail image attachment.",
        ))
}

pub async fn run(ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
    command.defer(&ctx.http).await?;

    let mut title = "";
    let mut main_text = "";
    let mut color_text: Option<&str> = None;
    let mut image: Option<&Attachment> = None;
    let mut thumbnail: Option<&Attachment> = None;
    for option in command.data.options() {
        match option.value {
            ResolvedValue::String(text) if option.name == "title" => title = text,
            ResolvedValue::String(text) if option.name == "main_text" => main_text = text,
            ResolvedValue::String(text) if option.name == "color" => color_text = Some(text),
            ResolvedValue::Attachment(attachment) if option.name == "image" => {
                image = Some(attachment)
            }
            ResolvedValue::Attachment(attachment) if option.name == "thumbnail" => {
                thumbnail = Some(attachment)
            }
            _ => {}
        }
    }

    let color = match color_text {
        Some(text) => match parse_hex_color(text) {
            Some(color) => color,
            None => {
                let followup = CreateInteractionResponseFollowup::new()
                    .content("Invalid hex color format. Please use a format like `#DBBE93`.")
                    .ephemeral(true);
                command.create_followup(&ctx.http, followup).await?;
                return Ok(());
            }
        },
        None => COMMUNITY_COLOR,
    };

    let (description, fields) = split_sections(main_text);
    let mut embed = CreateEmbed::new()
        .title(title)
        .description(description)
        .color(color)
        .timestamp(Timestamp::now())
        .author(
            CreateEmbedAuthor::new(command.user.display_name()).icon_url(command.user.face()),
        );
    for (name, value) in fields {
        embed = embed.field(name, value, false);
    }

    if let Some(guild_id) = command.guild_id {
        match guild_id.to_partial_guild(&ctx.http).await {
            Ok(guild) => {
                let mut footer = CreateEmbedFooter::new(guild.name.clone());
                if let Some(icon) = guild.icon_url() {
                    footer = footer.icon_url(icon);
                }
                embed = embed.footer(footer);
            }
            Err(e) => debug!("Could not fetch guild for embed footer: {}", e),
        }
    }

    let mut followup = CreateInteractionResponseFollowup::new();
    if let Some(attachment) = image {
        match reupload(attachment).await {
            Some(file) => {
                followup = followup.add_file(file);
                embed = embed.image(format!("attachment://{}", attachment.filename));
            }
            None => {
                warn!("Skipping image attachment {}", attachment.filename);
            }
        }
    }
    if let Some(attachment) = thumbnail {
        match reupload(attachment).await {
            Some(file) => {
                followup = followup.add_file(file);
                embed = embed.thumbnail(format!("attachment://{}", attachment.filename));
            }
            None => {
                warn!("Skipping thumbnail attachment {}", attachment.filename);
            }
        }
    }

    command
        .create_followup(&ctx.http, followup.embed(embed))
        .await?;
    Ok(())
}

/// Downloads an interaction attachment so it can be re-sent with the embed.
async fn reupload(attachment: &Attachment) -> Option<CreateAttachment> {
    match attachment.download().await {
        Ok(bytes) => Some(CreateAttachment::bytes(bytes, attachment.filename.clone())),
        Err(e) => {
            warn!("Failed to download attachment {}: {}", attachment.filename, e);
            None
        }
    }
}

/// Splits announcement text into the free description and `{{Title}} value`
/// field sections. `//` becomes a line break in both parts; fields with a
/// blank title or value are dropped.
fn split_sections(text: &str) -> (String, Vec<(String, String)>) {
    let (description, rest) = match text.find("{{") {
        Some(at) => text.split_at(at),
        None => (text, ""),
    };

    let mut fields = Vec::new();
    for segment in rest.split("{{").skip(1) {
        let Some((name, value)) = segment.split_once("}}") else {
            continue;
        };
        let name = name.trim();
        let value = normalize(value);
        if !name.is_empty() && !value.is_empty() {
            fields.push((name.to_string(), value));
        }
    }

    (normalize(description), fields)
}

fn normalize(text: &str) -> String {
    text.replace("//", "\n").trim().to_string()
}

/// Parses `#DBBE93`-style colors; the leading `#` is optional.
fn parse_hex_color(text: &str) -> Option<u32> {
    let digits = text.trim().trim_start_matches('#');
    u32::from_str_radix(digits, 16)
        .ok()
        .filter(|color| *color <= 0xFFFFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_has_no_fields() {
        let (description, fields) = split_sections("Join us!//See you there.");
        assert_eq!(description, "Join us!\nSee you there.");
        assert!(fields.is_empty());
    }

    #[test]
    fn fields_split_from_description() {
        let (description, fields) =
            split_sections("Join us!//{{Details}} At 8 PM sharp.{{Where}} Main hall");
        assert_eq!(description, "Join us!");
        assert_eq!(
            fields,
            vec![
                ("Details".to_string(), "At 8 PM sharp.".to_string()),
                ("Where".to_string(), "Main hall".to_string()),
            ]
        );
    }

    #[test]
    fn blank_field_parts_are_dropped() {
        let (_, fields) = split_sections("intro {{}} no title {{Title}}   {{Kept}} value");
        assert_eq!(fields, vec![("Kept".to_string(), "value".to_string())]);
    }

    #[test]
    fn unterminated_field_is_ignored() {
        let (description, fields) = split_sections("intro {{Broken field");
        assert_eq!(description, "intro");
        assert!(fields.is_empty());
    }

    #[test]
    fn hex_colors_parse_with_or_without_hash() {
        assert_eq!(parse_hex_color("#DBBE93"), Some(0xDBBE93));
        assert_eq!(parse_hex_color("DBBE93"), Some(0xDBBE93));
        assert_eq!(parse_hex_color(" #0000ff "), Some(0x0000FF));
    }

    #[test]
    fn bad_hex_colors_are_rejected() {
        assert_eq!(parse_hex_color("not-a-color"), None);
        assert_eq!(parse_hex_color("#1234567"), None);
        assert_eq!(parse_hex_color(""), None);
    }
}
