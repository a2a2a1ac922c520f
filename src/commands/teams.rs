//! Team reporting: the `!report` prompt, its select menus, and `/teams`

use std::collections::HashMap;
use std::sync::Arc;

use serenity::all::{
    CommandInteraction, ComponentInteraction, ComponentInteractionDataKind, Context, CreateActionRow,
    CreateCommand, CreateEmbed, CreateEmbedFooter, CreateInteractionResponseFollowup, CreateMessage,
    CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption, Member, Mentionable, Message,
    Role, RoleId, Timestamp, User,
};
use tracing::{debug, warn};

use crate::render::COMMUNITY_COLOR;
use crate::services::roles::{assign_team_role, is_catalog_role};
use crate::state::AppState;

pub const SELECT_PREFIX: &str = "team_select";

const ROSTER_COLOR: u32 = 0xE74C3C;

pub fn definition() -> CreateCommand {
    CreateCommand::new("teams").description("Displays a list of all teams and their members.")
}

/// Posts the team-reporting prompt with both dropdown menus, then removes
/// the invoking `!report` message (best effort).
pub async fn post_report_prompt(
    ctx: &Context,
    state: &Arc<AppState>,
    msg: &Message,
) -> serenity::Result<()> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    let roles = guild_id.roles(&ctx.http).await?;

    // The first dropdown keeps the catalog order; the second is alphabetical.
    let first = resolve_catalog(&state.settings.team_roles_first, &roles);
    let mut second = resolve_catalog(&state.settings.team_roles_second, &roles);
    second.sort_by(|a, b| a.1.cmp(&b.1));

    let mut embed = CreateEmbed::new()
        .title("📣 Hear! Hear! Debaters — Team Reporting")
        .color(COMMUNITY_COLOR)
        .description(report_description(state.settings.debater_role));
    match guild_id.to_partial_guild(&ctx.http).await {
        Ok(guild) => {
            let mut footer = CreateEmbedFooter::new(guild.name.clone());
            if let Some(icon) = guild.icon_url() {
                footer = footer.icon_url(icon);
            }
            embed = embed.footer(footer);
        }
        Err(e) => debug!("Could not fetch guild for report footer: {}", e),
    }

    let mut components = Vec::new();
    if !first.is_empty() {
        components.push(select_row(
            "first",
            "Dropdown 1: 🎯 Pick Team (First Half) 🔽",
            &first,
        ));
    }
    if !second.is_empty() {
        components.push(select_row(
            "second",
            "Dropdown 2: 🎯 Pick Team (Second Half) 🔽",
            &second,
        ));
    }

    msg.channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(embed).components(components),
        )
        .await?;

    // The prompt replaces the invocation; deletion can fail without consequence.
    if let Err(e) = msg.delete(&ctx.http).await {
        debug!("Could not delete !report invocation: {}", e);
    }
    Ok(())
}

fn report_description(debater_role: u64) -> String {
    format!(
        "Dear {},\n\n\
         Please report your team by selecting your **team name** from the dropdown menu. \
         ⚠️ Choose carefully — all names are arranged in alphabetical order (A → Z).\n\n\
         ✅ Once you select, you'll be assigned your team role automatically.\n\
         🚫 Do not select more than one team.\n\n\
         Thank you for reporting on time — it helps us keep the event organized and smooth. 🏆",
        RoleId::new(debater_role).mention()
    )
}

/// Handles a selection from either team dropdown.
pub async fn run_select(
    ctx: &Context,
    state: &Arc<AppState>,
    component: &ComponentInteraction,
) -> serenity::Result<()> {
    component.defer_ephemeral(&ctx.http).await?;

    let ComponentInteractionDataKind::StringSelect { values } = &component.data.kind else {
        return Ok(());
    };
    let chosen = values
        .first()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|id| *id != 0)
        .map(RoleId::new);

    let Some(chosen) = chosen else {
        return error_followup(ctx, component, "Error: Could not find the selected role.").await;
    };
    if !is_catalog_role(&state.settings, chosen) {
        return error_followup(ctx, component, "Error: Could not find the selected role.").await;
    }
    let Some(member) = component.member.as_ref() else {
        return error_followup(ctx, component, "Team reporting only works inside a server.").await;
    };

    if let Err(e) = assign_team_role(&ctx.http, &state.settings, member, chosen).await {
        warn!(
            "Failed to update team roles for {}: {}",
            member.user.name, e
        );
        return error_followup(ctx, component, "Error: Could not update your team roles.").await;
    }

    let confirmation = format!("🎯 Successfully reported as {} ✅", chosen.mention());
    let followup = CreateInteractionResponseFollowup::new()
        .content(confirmation)
        .ephemeral(true);
    component.create_followup(&ctx.http, followup).await?;
    Ok(())
}

async fn error_followup(
    ctx: &Context,
    component: &ComponentInteraction,
    content: &str,
) -> serenity::Result<()> {
    let followup = CreateInteractionResponseFollowup::new()
        .content(content)
        .ephemeral(true);
    component.create_followup(&ctx.http, followup).await?;
    Ok(())
}

/// `/teams`: posts the roster of both catalog halves as two embeds.
pub async fn run_teams(
    ctx: &Context,
    state: &Arc<AppState>,
    command: &CommandInteraction,
) -> serenity::Result<()> {
    command.defer(&ctx.http).await?;

    let Some(guild_id) = command.guild_id else {
        let followup = CreateInteractionResponseFollowup::new()
            .content("This command only works inside a server.")
            .ephemeral(true);
        command.create_followup(&ctx.http, followup).await?;
        return Ok(());
    };

    let roles = guild_id.roles(&ctx.http).await?;
    let members = guild_id.members(&ctx.http, None, None).await?;
    let icon = guild_id
        .to_partial_guild(&ctx.http)
        .await
        .ok()
        .and_then(|guild| guild.icon_url());

    let first = resolve_catalog(&state.settings.team_roles_first, &roles);
    let second = resolve_catalog(&state.settings.team_roles_second, &roles);

    let embed = roster_embed(
        "🏆 Team List (Part 1/2) 🏆",
        "Here are the first registered teams and their members.",
        &first,
        &members,
        icon.clone(),
        &command.user,
    );
    command
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new().embed(embed),
        )
        .await?;

    if !second.is_empty() {
        let embed = roster_embed(
            "🏆 Team List (Part 2/2) 🏆",
            "Here are the remaining registered teams and their members.",
            &second,
            &members,
            icon,
            &command.user,
        );
        command
            .create_followup(
                &ctx.http,
                CreateInteractionResponseFollowup::new().embed(embed),
            )
            .await?;
    }
    Ok(())
}

/// Resolves catalog role ids against the live guild role list, keeping the
/// catalog order and skipping roles that no longer exist.
fn resolve_catalog(ids: &[u64], roles: &HashMap<RoleId, Role>) -> Vec<(RoleId, String)> {
    ids.iter()
        .filter_map(|id| {
            let role_id = RoleId::new(*id);
            roles.get(&role_id).map(|role| (role_id, role.name.clone()))
        })
        .collect()
}

fn select_row(half: &str, placeholder: &str, teams: &[(RoleId, String)]) -> CreateActionRow {
    let options = teams
        .iter()
        .map(|(role_id, name)| CreateSelectMenuOption::new(name.clone(), role_id.to_string()))
        .collect();
    CreateActionRow::SelectMenu(
        CreateSelectMenu::new(
            format!("{SELECT_PREFIX}:{half}"),
            CreateSelectMenuKind::String { options },
        )
        .placeholder(placeholder)
        .min_values(1)
        .max_values(1),
    )
}

fn roster_embed(
    title: &str,
    description: &str,
    teams: &[(RoleId, String)],
    members: &[Member],
    icon: Option<String>,
    requester: &User,
) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(title)
        .description(description)
        .color(ROSTER_COLOR)
        .timestamp(Timestamp::now())
        .footer(
            CreateEmbedFooter::new(format!("Requested by {}", requester.display_name()))
                .icon_url(requester.face()),
        );
    if let Some(icon) = icon {
        embed = embed.thumbnail(icon);
    }

    for (role_id, name) in teams {
        let mentions: Vec<String> = members
            .iter()
            .filter(|member| member.roles.contains(role_id))
            .map(|member| member.mention().to_string())
            .collect();
        let value = if mentions.is_empty() {
            "👻 No members have reported to this team yet.".to_string()
        } else {
            let joined = mentions.join(" ");
            // Discord caps field values at 1024 characters.
            if joined.len() > 1024 {
                format!("{} members (list too long to display).", mentions.len())
            } else {
                joined
            }
        };
        embed = embed.field(format!("**{name}**"), value, false);
    }
    embed
}
