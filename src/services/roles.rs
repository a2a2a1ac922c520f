//! Team-role assignment and the watched-role announcement

use std::sync::Arc;
use std::time::Duration;

use serenity::all::{
    ChannelId, Context, GuildMemberUpdateEvent, Member, Mentionable, RoleId,
};
use serenity::http::Http;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::GuildSettings;
use crate::state::AppState;

/// Applies a team selection: the chosen role replaces any other catalog role
/// the member currently holds. Selecting an already-held role only strips
/// the others.
pub async fn assign_team_role(
    http: &Arc<Http>,
    settings: &GuildSettings,
    member: &Member,
    chosen: RoleId,
) -> serenity::Result<()> {
    let to_remove: Vec<RoleId> = settings
        .all_team_roles()
        .map(RoleId::new)
        .filter(|role_id| *role_id != chosen && member.roles.contains(role_id))
        .collect();

    if !to_remove.is_empty() {
        member.remove_roles(http, &to_remove).await?;
    }
    if !member.roles.contains(&chosen) {
        member.add_role(http, chosen).await?;
    }
    Ok(())
}

/// True when `role` is part of the configured team catalog.
pub fn is_catalog_role(settings: &GuildSettings, role: RoleId) -> bool {
    settings.all_team_roles().any(|id| id == role.get())
}

/// Announces a newly granted watched role with a short-lived cheer in the
/// configured channel. Without the previous member state we cannot tell
/// whether the role is actually new, so those updates are skipped.
pub async fn announce_watched_role(
    ctx: &Context,
    state: &Arc<AppState>,
    old: Option<&Member>,
    new: Option<&Member>,
    event: &GuildMemberUpdateEvent,
) {
    if event.user.bot {
        return;
    }
    let watched = RoleId::new(state.settings.watched_role);
    let Some(old) = old else {
        return;
    };
    let has_now = new
        .map(|member| member.roles.contains(&watched))
        .unwrap_or_else(|| event.roles.contains(&watched));
    if old.roles.contains(&watched) || !has_now {
        return;
    }

    let channel = ChannelId::new(state.settings.announce_channel);
    let content = format!("📢 Hear hear! {}", event.user.mention());
    match channel.say(&ctx.http, content).await {
        Ok(message) => {
            // The cheer is transient; take it down a minute later.
            let http: Arc<Http> = ctx.http.clone();
            tokio::spawn(async move {
                sleep(Duration::from_secs(60)).await;
                if let Err(e) = message.delete(&http).await {
                    debug!("Could not delete role announcement: {}", e);
                }
            });
        }
        Err(e) => warn!(
            "Could not send role announcement to channel {}: {}",
            channel, e
        ),
    }
}
