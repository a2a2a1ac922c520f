//! Main application state management

use std::sync::Arc;
use std::time::Instant;

use serenity::all::GuildId;

use crate::config::GuildSettings;
use crate::services::welcome::BannerComposer;
use crate::state::registry::TimerRegistry;

/// Shared state threaded through every event handler and background task.
pub struct AppState {
    /// Channel wiring and the team-role catalog.
    pub settings: GuildSettings,
    /// The guild this bot instance serves.
    pub guild_id: GuildId,
    /// Single source of truth for active timers.
    pub registry: TimerRegistry,
    /// Welcome banner compositor; `None` falls back to bannerless embeds.
    pub banner: Option<Arc<dyn BannerComposer>>,
    /// Process start, for uptime reporting at shutdown.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: GuildSettings, guild_id: GuildId) -> Self {
        Self {
            settings,
            guild_id,
            registry: TimerRegistry::new(),
            banner: None,
            start_time: Instant::now(),
        }
    }

    /// Process uptime as a short human-readable string.
    pub fn uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
