//! `/purge` — bulk message deletion

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateInteractionResponseFollowup, GetMessages, MessageId, Permissions, ResolvedValue,
};

use crate::commands::ephemeral_reply;

pub fn definition() -> CreateCommand {
    CreateCommand::new("purge")
        .description("Deletes a specified number of messages from the channel.")
        .default_member_permissions(Permissions::MANAGE_MESSAGES)
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Integer,
                "count",
                "The number of messages to delete (up to 100).",
            )
            .min_int_value(1)
            .max_int_value(100)
            .required(true),
        )
}

pub async fn run(ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
    let allowed = command
        .member
        .as_ref()
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.manage_messages());
    if !allowed {
        return ephemeral_reply(
            ctx,
            command,
            "🚫 You do not have the required permissions (Manage Messages) to use this command.",
        )
        .await;
    }

    let mut count: i64 = 0;
    for option in command.data.options() {
        if let ResolvedValue::Integer(value) = option.value {
            if option.name == "count" {
                count = value;
            }
        }
    }
    let count = count.clamp(1, 100) as u8;

    command.defer_ephemeral(&ctx.http).await?;

    let messages = command
        .channel_id
        .messages(&ctx.http, GetMessages::new().limit(count))
        .await?;
    let ids: Vec<MessageId> = messages.iter().map(|message| message.id).collect();
    let deleted = ids.len();

    match deleted {
        0 => {}
        // Bulk deletion requires at least two messages.
        1 => {
            command
                .channel_id
                .delete_message(&ctx.http, ids[0])
                .await?
        }
        _ => {
            command
                .channel_id
                .delete_messages(&ctx.http, ids)
                .await?
        }
    }

    let followup = CreateInteractionResponseFollowup::new()
        .content(format!("✅ Successfully deleted {deleted} message(s)."))
        .ephemeral(true);
    command.create_followup(&ctx.http, followup).await?;
    Ok(())
}
