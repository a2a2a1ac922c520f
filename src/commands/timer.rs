//! `/time` command and the timer control buttons

use std::sync::Arc;
use std::time::Duration;

use serenity::all::{
    CommandInteraction, CommandOptionType, ComponentInteraction, Context, CreateCommand,
    CreateCommandOption, CreateInteractionResponse, CreateInteractionResponseMessage, EditMessage,
    Mentionable, ResolvedValue, User,
};
use tracing::{error, warn};

use crate::commands::{ephemeral_ack, ephemeral_reply};
use crate::error::TimerError;
use crate::render::{self, Attribution};
use crate::services::timer::{control_row, EndOutcome, TimerService, ToggleOutcome};
use crate::state::registry::{TimerAction, TimerKey};
use crate::state::AppState;
use crate::utils::parse_duration;

pub fn definition() -> CreateCommand {
    CreateCommand::new("time")
        .description("Starts a timer for a debate or speech.")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "duration",
                "Duration of the timer (e.g., '1h 20m 30s').",
            )
            .required(true),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::User,
            "user",
            "The user to start the timer for (optional).",
        ))
}

pub async fn run(
    ctx: &Context,
    state: &Arc<AppState>,
    command: &CommandInteraction,
) -> serenity::Result<()> {
    let mut duration_text = "";
    let mut subject: Option<&User> = None;
    for option in command.data.options() {
        match option.value {
            ResolvedValue::String(text) if option.name == "duration" => duration_text = text,
            ResolvedValue::User(user, _) if option.name == "user" => subject = Some(user),
            _ => {}
        }
    }
    let subject = subject.unwrap_or(&command.user);

    let seconds = parse_duration(duration_text);
    if seconds == 0 {
        return ephemeral_reply(ctx, command, &TimerError::InvalidDuration.to_string()).await;
    }
    let Some(guild_id) = command.guild_id else {
        return ephemeral_reply(ctx, command, "Timers can only run inside a server.").await;
    };

    let key = TimerKey::new(guild_id, command.channel_id, subject.id);
    let who = Attribution {
        owner_name: subject.display_name().to_string(),
        owner_face: subject.face(),
        starter_name: command.user.display_name().to_string(),
        starter_face: command.user.face(),
    };

    let service = TimerService::new(state.clone(), ctx.http.clone());
    match service.register(key, Duration::from_secs(seconds), who.clone()) {
        Ok(()) => {}
        Err(TimerError::AlreadyActive) => {
            let notice = format!("A timer is already active for {}.", subject.mention());
            return ephemeral_reply(ctx, command, &notice).await;
        }
        Err(e) => {
            error!("Failed to register timer {}: {}", key, e);
            return ephemeral_reply(ctx, command, "Something went wrong starting the timer.")
                .await;
        }
    }

    let embed = render::timer_embed(seconds, seconds, render::STARTING, &who);
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .embed(embed)
            .components(vec![control_row(&key, false, false)]),
    );
    if let Err(e) = command.create_response(&ctx.http, response).await {
        // The display message never materialized; roll the registration back.
        rollback(state, &key);
        return Err(e);
    }

    let message = match command.get_response(&ctx.http).await {
        Ok(message) => message,
        Err(e) => {
            rollback(state, &key);
            return Err(e);
        }
    };

    if let Err(e) = service.activate(key, message.id) {
        error!("Failed to activate timer {}: {}", key, e);
    }
    Ok(())
}

fn rollback(state: &Arc<AppState>, key: &TimerKey) {
    if let Err(e) = state.registry.deregister(key) {
        error!("Failed to roll back timer {}: {}", key, e);
    }
}

/// Handles a press on one of the two control buttons. The key is decoded
/// from the button's custom_id and resolved against the registry here, at
/// press time; no timer state is ever cached in the component.
pub async fn run_component(
    ctx: &Context,
    state: &Arc<AppState>,
    component: &ComponentInteraction,
) -> serenity::Result<()> {
    let Some((action, key)) = TimerKey::from_custom_id(&component.data.custom_id) else {
        warn!(
            "Malformed timer control custom_id: {}",
            component.data.custom_id
        );
        return Ok(());
    };

    let service = TimerService::new(state.clone(), ctx.http.clone());
    match action {
        TimerAction::TogglePause => match service.toggle(&key) {
            Ok(ToggleOutcome::Paused) => {
                ephemeral_ack(ctx, component, "Timer paused!").await?;
                update_controls(ctx, component, &key, true).await;
            }
            Ok(ToggleOutcome::Resumed) => {
                ephemeral_ack(ctx, component, "Timer resumed!").await?;
                update_controls(ctx, component, &key, false).await;
            }
            Ok(ToggleOutcome::AlreadyOver) => {
                ephemeral_ack(ctx, component, "This timer has already ended.").await?;
            }
            Err(e) => {
                error!("Failed to toggle timer {}: {}", key, e);
                ephemeral_ack(ctx, component, "Something went wrong.").await?;
            }
        },
        TimerAction::End => match service.end(&key).await {
            Ok(EndOutcome::Ended) => {
                ephemeral_ack(ctx, component, "Timer ended.").await?;
            }
            Ok(EndOutcome::AlreadyOver) => {
                ephemeral_ack(ctx, component, "This timer has already ended.").await?;
            }
            Err(e) => {
                error!("Failed to end timer {}: {}", key, e);
                ephemeral_ack(ctx, component, "Something went wrong.").await?;
            }
        },
    }
    Ok(())
}

/// Flips the toggle button's label in place after a pause or resume.
async fn update_controls(
    ctx: &Context,
    component: &ComponentInteraction,
    key: &TimerKey,
    paused: bool,
) {
    let edit = EditMessage::new().components(vec![control_row(key, paused, false)]);
    if let Err(e) = component
        .message
        .channel_id
        .edit_message(&ctx.http, component.message.id, edit)
        .await
    {
        warn!("Failed to update timer controls for {}: {}", key, e);
    }
}
