//! Timer lifecycle orchestration
//!
//! Owns every side effect of the timer engine: registering state, binding the
//! rendered display message, pushing display updates, sending threshold
//! notifications and tearing down finished or abandoned timers. The pure
//! state transitions live in [`crate::state::timer_state`]; this service
//! wraps them with Discord I/O. Background failures are recovered here so
//! that one timer's trouble never affects another timer or its tasks.

use std::sync::Arc;
use std::time::Duration;

use serenity::all::{
    ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, EditMessage, Mentionable, MessageId,
    ReactionType,
};
use serenity::http::{Http, HttpError};
use tracing::{debug, error, info, warn};

use crate::error::TimerError;
use crate::render::{self, Attribution};
use crate::state::registry::{TimerAction, TimerKey};
use crate::state::timer_state::TimerState;
use crate::state::AppState;
use crate::tasks::expiry_watcher::expiry_watcher_task;

/// Result of a pause/resume toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Paused,
    Resumed,
    /// The timer was already terminal or gone; nothing was changed.
    AlreadyOver,
}

/// Result of an explicit stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOutcome {
    Ended,
    AlreadyOver,
}

/// Orchestrates one or more timers against the shared registry.
pub struct TimerService {
    state: Arc<AppState>,
    http: Arc<Http>,
}

impl TimerService {
    pub fn new(state: Arc<AppState>, http: Arc<Http>) -> Self {
        Self { state, http }
    }

    /// Registers a new Running timer for `key`. Fails on identity collision.
    pub fn register(
        &self,
        key: TimerKey,
        duration: Duration,
        who: Attribution,
    ) -> Result<(), TimerError> {
        self.state
            .registry
            .register(key, TimerState::new(duration, who))?;
        info!(
            "Registered timer {} for {} seconds",
            key,
            duration.as_secs()
        );
        Ok(())
    }

    /// Binds the rendered display message to `key` and spawns its expiry
    /// watcher.
    pub fn activate(&self, key: TimerKey, message_id: MessageId) -> Result<(), TimerError> {
        self.state
            .registry
            .with_timer(&key, |timer| timer.message_id = Some(message_id))?;
        let watcher = tokio::spawn(expiry_watcher_task(
            self.state.clone(),
            self.http.clone(),
            key,
        ));
        self.state.registry.attach_watcher(&key, watcher)
    }

    /// Pauses a running timer or resumes a paused one. The registry is
    /// consulted at call time; a terminal or vanished timer is left alone.
    pub fn toggle(&self, key: &TimerKey) -> Result<ToggleOutcome, TimerError> {
        let outcome = self.state.registry.with_timer(key, |timer| {
            if timer.pause() {
                ToggleOutcome::Paused
            } else if timer.resume() {
                ToggleOutcome::Resumed
            } else {
                ToggleOutcome::AlreadyOver
            }
        })?;
        let outcome = outcome.unwrap_or(ToggleOutcome::AlreadyOver);
        if outcome != ToggleOutcome::AlreadyOver {
            info!("Timer {} toggled: {:?}", key, outcome);
        }
        Ok(outcome)
    }

    /// Explicitly stops a timer: one final terminal render with disabled
    /// controls, then deregistration.
    pub async fn end(&self, key: &TimerKey) -> Result<EndOutcome, TimerError> {
        let snapshot = self.state.registry.with_timer(key, |timer| {
            timer
                .end()
                .then(|| (timer.message_id, snapshot_embed(timer)))
        })?;
        let Some(Some((message_id, embed))) = snapshot else {
            return Ok(EndOutcome::AlreadyOver);
        };

        self.push_display(key, message_id, embed, true).await;
        if let Err(e) = self.state.registry.deregister(key) {
            error!("Failed to deregister timer {}: {}", key, e);
        }
        info!("Timer {} ended by user action", key);
        Ok(EndOutcome::Ended)
    }

    /// One-time "1 minute left" notification, best effort.
    pub async fn send_warning(&self, key: &TimerKey) {
        let content = format!("📢 Hear Hear! 1 minute left, {}", key.user_id.mention());
        if let Err(e) = key.channel_id.say(&self.http, content).await {
            warn!("Failed to send one-minute warning for {}: {}", key, e);
        }
    }

    /// Terminal path driven by the expiry watcher once the deadline passes:
    /// "time's up" notification, final render with disabled controls,
    /// deregistration.
    ///
    /// Deregistration aborts the watcher's own task handle. The watcher exits
    /// right after this returns and nothing awaits in between, so the abort
    /// never cuts the cleanup short.
    pub async fn finish(&self, key: &TimerKey) {
        let snapshot = match self
            .state
            .registry
            .with_timer(key, |timer| (timer.message_id, snapshot_embed(timer)))
        {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return,
            Err(e) => {
                error!("Failed to read timer {} while finishing: {}", key, e);
                return;
            }
        };

        let content = format!("⏰ Time's up, {}!", key.user_id.mention());
        if let Err(e) = key.channel_id.say(&self.http, content).await {
            warn!("Failed to send expiry notification for {}: {}", key, e);
        }

        let (message_id, embed) = snapshot;
        self.push_display(key, message_id, embed, true).await;
        if let Err(e) = self.state.registry.deregister(key) {
            error!("Failed to deregister timer {}: {}", key, e);
        }
        info!("Timer {} finished", key);
    }

    /// Tick-loop refresh of the rendered display. A display message that has
    /// been deleted deregisters the timer; any other delivery failure is
    /// logged and retried implicitly on the next tick.
    pub async fn refresh(&self, key: &TimerKey) {
        let snapshot = match self
            .state
            .registry
            .with_timer(key, |timer| (timer.message_id, snapshot_embed(timer)))
        {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return,
            Err(e) => {
                error!("Failed to read timer {} while refreshing: {}", key, e);
                return;
            }
        };
        let (Some(message_id), embed) = snapshot else {
            // Still inside the creation window; nothing to refresh yet.
            return;
        };

        let edit = EditMessage::new().embed(embed);
        if let Err(e) = key
            .channel_id
            .edit_message(&self.http, message_id, edit)
            .await
        {
            if is_unknown_message(&e) {
                debug!("Display message for {} is gone, deregistering", key);
                if let Err(e) = self.state.registry.deregister(key) {
                    error!("Failed to deregister orphaned timer {}: {}", key, e);
                }
            } else {
                warn!("Failed to refresh timer display for {}: {}", key, e);
            }
        }
    }

    /// Edits the display message in place, logging failures. Used for
    /// transition renders where the control row changes alongside the embed.
    async fn push_display(
        &self,
        key: &TimerKey,
        message_id: Option<MessageId>,
        embed: CreateEmbed,
        disabled: bool,
    ) {
        let Some(message_id) = message_id else {
            return;
        };
        let edit = EditMessage::new()
            .embed(embed)
            .components(vec![control_row(key, false, disabled)]);
        if let Err(e) = key
            .channel_id
            .edit_message(&self.http, message_id, edit)
            .await
        {
            warn!("Failed to update timer display for {}: {}", key, e);
        }
    }
}

/// Renders the embed for a timer's current phase and remaining time.
fn snapshot_embed(timer: &TimerState) -> CreateEmbed {
    render::timer_embed(
        timer.remaining().as_secs(),
        timer.initial_seconds(),
        timer.display_style(),
        &timer.who,
    )
}

/// The Pause/Resume + End button row bound to `key`. Buttons carry only the
/// identity; every press is resolved against the registry when it arrives.
pub fn control_row(key: &TimerKey, paused: bool, disabled: bool) -> CreateActionRow {
    let (label, emoji) = if paused {
        ("Resume", "▶️")
    } else {
        ("Pause", "⏸️")
    };
    CreateActionRow::Buttons(vec![
        CreateButton::new(key.custom_id(TimerAction::TogglePause))
            .label(label)
            .style(ButtonStyle::Secondary)
            .emoji(ReactionType::Unicode(emoji.to_string()))
            .disabled(disabled),
        CreateButton::new(key.custom_id(TimerAction::End))
            .label("End")
            .style(ButtonStyle::Danger)
            .emoji(ReactionType::Unicode("⏹️".to_string()))
            .disabled(disabled),
    ])
}

/// True when an edit failed because the target message no longer exists.
fn is_unknown_message(error: &serenity::Error) -> bool {
    match error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            response.status_code == 404
        }
        _ => false,
    }
}
