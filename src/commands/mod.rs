//! Interaction surface: slash command registration and dispatch

pub mod content;
pub mod misc;
pub mod moderation;
pub mod teams;
pub mod timer;

use std::sync::Arc;

use serenity::all::{
    CommandInteraction, ComponentInteraction, Context, CreateCommand, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use tracing::{error, warn};

use crate::state::AppState;

/// All guild-scoped application commands this bot registers on startup.
pub fn command_definitions() -> Vec<CreateCommand> {
    vec![
        timer::definition(),
        content::definition(),
        teams::definition(),
        moderation::definition(),
        misc::coinflip_definition(),
        misc::guide_definition(),
    ]
}

/// Routes a slash command to its handler.
pub async fn dispatch_command(ctx: &Context, state: &Arc<AppState>, command: &CommandInteraction) {
    let result = match command.data.name.as_str() {
        "time" => timer::run(ctx, state, command).await,
        "content" => content::run(ctx, command).await,
        "teams" => teams::run_teams(ctx, state, command).await,
        "purge" => moderation::run(ctx, command).await,
        "coinflip" => misc::run_coinflip(ctx, command).await,
        "guide" => misc::run_guide(ctx, command).await,
        other => {
            warn!("Received unknown command /{}", other);
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("Command /{} failed: {}", command.data.name, e);
    }
}

/// Routes a component interaction (timer controls, team selects).
pub async fn dispatch_component(
    ctx: &Context,
    state: &Arc<AppState>,
    component: &ComponentInteraction,
) {
    let custom_id = component.data.custom_id.as_str();
    let result = if custom_id.starts_with("timer:") {
        timer::run_component(ctx, state, component).await
    } else if custom_id.starts_with(teams::SELECT_PREFIX) {
        teams::run_select(ctx, state, component).await
    } else {
        warn!("Received component with unknown custom_id {}", custom_id);
        Ok(())
    };

    if let Err(e) = result {
        error!(
            "Component interaction {} failed: {}",
            component.data.custom_id, e
        );
    }
}

/// Replies to a slash command with a short ephemeral message.
pub(crate) async fn ephemeral_reply(
    ctx: &Context,
    command: &CommandInteraction,
    content: &str,
) -> serenity::Result<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await
}

/// Acknowledges a component press with a short ephemeral message.
pub(crate) async fn ephemeral_ack(
    ctx: &Context,
    component: &ComponentInteraction,
    content: &str,
) -> serenity::Result<()> {
    component
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await
}
