//! Gateway event handling

use std::sync::Arc;

use serenity::all::{
    Context, EventHandler, GuildMemberUpdateEvent, Interaction, Member, Message, Ready,
};
use serenity::async_trait;
use tracing::{error, info};

use crate::commands;
use crate::services::{roles, welcome};
use crate::state::AppState;

pub struct Handler {
    state: Arc<AppState>,
}

impl Handler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Logged in as {} (ID: {})", ready.user.name, ready.user.id);

        match self
            .state
            .guild_id
            .set_commands(&ctx.http, commands::command_definitions())
            .await
        {
            Ok(registered) => info!("Registered {} guild commands", registered.len()),
            Err(e) => error!("Failed to register guild commands: {}", e),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        if msg.content.trim() == "!report" {
            if let Err(e) = commands::teams::post_report_prompt(&ctx, &self.state, &msg).await {
                error!("Failed to post team reporting prompt: {}", e);
            }
        }
    }

    async fn guild_member_addition(&self, ctx: Context, member: Member) {
        welcome::greet(&ctx, &self.state, &member).await;
    }

    async fn guild_member_update(
        &self,
        ctx: Context,
        old: Option<Member>,
        new: Option<Member>,
        event: GuildMemberUpdateEvent,
    ) {
        roles::announce_watched_role(&ctx, &self.state, old.as_ref(), new.as_ref(), &event).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                commands::dispatch_command(&ctx, &self.state, &command).await;
            }
            Interaction::Component(component) => {
                commands::dispatch_component(&ctx, &self.state, &component).await;
            }
            _ => {}
        }
    }
}
