//! Shared registry of active timers
//!
//! The registry is the single source of truth for "is a timer active here".
//! It is owned by [`AppState`](super::AppState) and shared by reference with
//! the tick loop, every expiry watcher and the control-surface handlers. The
//! inner mutex is only ever held for short non-blocking closures, never
//! across an await point.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serenity::all::{ChannelId, GuildId, UserId};
use tokio::task::JoinHandle;

use crate::error::TimerError;
use crate::state::timer_state::TimerState;

/// Composite identity of one countdown. At most one active timer may exist
/// per (guild, channel, subject) at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub user_id: UserId,
}

/// Control-surface actions that can be bound to a [`TimerKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    TogglePause,
    End,
}

impl TimerAction {
    fn as_str(self) -> &'static str {
        match self {
            TimerAction::TogglePause => "toggle",
            TimerAction::End => "end",
        }
    }
}

impl TimerKey {
    pub fn new(guild_id: GuildId, channel_id: ChannelId, user_id: UserId) -> Self {
        Self {
            guild_id,
            channel_id,
            user_id,
        }
    }

    /// Encodes an action bound to this identity as a component `custom_id`.
    ///
    /// Buttons carry only this binding; handlers resolve it back against the
    /// registry at press time so they always act on live state.
    pub fn custom_id(&self, action: TimerAction) -> String {
        format!(
            "timer:{}:{}:{}:{}",
            action.as_str(),
            self.guild_id,
            self.channel_id,
            self.user_id
        )
    }

    /// Decodes a `custom_id` produced by [`Self::custom_id`].
    pub fn from_custom_id(custom_id: &str) -> Option<(TimerAction, TimerKey)> {
        let mut parts = custom_id.split(':');
        if parts.next()? != "timer" {
            return None;
        }
        let action = match parts.next()? {
            "toggle" => TimerAction::TogglePause,
            "end" => TimerAction::End,
            _ => return None,
        };
        let guild_id = parse_snowflake(parts.next()?)?;
        let channel_id = parse_snowflake(parts.next()?)?;
        let user_id = parse_snowflake(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some((
            action,
            TimerKey {
                guild_id: GuildId::new(guild_id),
                channel_id: ChannelId::new(channel_id),
                user_id: UserId::new(user_id),
            },
        ))
    }
}

fn parse_snowflake(text: &str) -> Option<u64> {
    text.parse::<u64>().ok().filter(|id| *id != 0)
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.guild_id, self.channel_id, self.user_id)
    }
}

/// One registered timer: its state plus the handle of its expiry watcher,
/// kept so deregistration can cancel the watcher.
#[derive(Debug)]
pub struct TimerEntry {
    pub state: TimerState,
    pub watcher: Option<JoinHandle<()>>,
}

/// Keyed store of every active timer.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: Mutex<HashMap<TimerKey, TimerEntry>>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self {
            timers: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<TimerKey, TimerEntry>>, TimerError> {
        self.timers
            .lock()
            .map_err(|e| TimerError::Registry(e.to_string()))
    }

    /// Registers a new timer, rejecting identity collisions.
    pub fn register(&self, key: TimerKey, state: TimerState) -> Result<(), TimerError> {
        let mut timers = self.lock()?;
        if timers.contains_key(&key) {
            return Err(TimerError::AlreadyActive);
        }
        timers.insert(
            key,
            TimerEntry {
                state,
                watcher: None,
            },
        );
        Ok(())
    }

    /// Attaches the expiry watcher handle to an already registered timer.
    pub fn attach_watcher(
        &self,
        key: &TimerKey,
        watcher: JoinHandle<()>,
    ) -> Result<(), TimerError> {
        if let Some(entry) = self.lock()?.get_mut(key) {
            entry.watcher = Some(watcher);
        }
        Ok(())
    }

    /// Runs `f` against the live state of `key`, if it is still registered.
    /// The registry lock is held for the duration of the closure, so `f`
    /// must not block.
    pub fn with_timer<R>(
        &self,
        key: &TimerKey,
        f: impl FnOnce(&mut TimerState) -> R,
    ) -> Result<Option<R>, TimerError> {
        Ok(self.lock()?.get_mut(key).map(|entry| f(&mut entry.state)))
    }

    /// Removes a timer and cancels its watcher. Removing an absent key is a
    /// no-op, so racing cleanup paths can both call this safely.
    pub fn deregister(&self, key: &TimerKey) -> Result<bool, TimerError> {
        let removed = self.lock()?.remove(key);
        match removed {
            Some(entry) => {
                if let Some(watcher) = entry.watcher {
                    watcher.abort();
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Snapshot of the registered keys, taken by the tick loop each second.
    pub fn keys(&self) -> Result<Vec<TimerKey>, TimerError> {
        Ok(self.lock()?.keys().copied().collect())
    }

    pub fn contains(&self, key: &TimerKey) -> Result<bool, TimerError> {
        Ok(self.lock()?.contains_key(key))
    }

    pub fn len(&self) -> Result<usize, TimerError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, TimerError> {
        Ok(self.lock()?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Attribution;
    use std::time::Duration;

    fn key() -> TimerKey {
        TimerKey::new(GuildId::new(10), ChannelId::new(20), UserId::new(30))
    }

    fn state() -> TimerState {
        TimerState::new(
            Duration::from_secs(90),
            Attribution {
                owner_name: "speaker".to_string(),
                owner_face: String::new(),
                starter_name: "chair".to_string(),
                starter_face: String::new(),
            },
        )
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let registry = TimerRegistry::new();
        registry.register(key(), state()).unwrap();
        assert!(matches!(
            registry.register(key(), state()),
            Err(TimerError::AlreadyActive)
        ));
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn registration_succeeds_after_deregistration() {
        let registry = TimerRegistry::new();
        registry.register(key(), state()).unwrap();
        assert!(registry.deregister(&key()).unwrap());
        registry.register(key(), state()).unwrap();
        assert!(registry.contains(&key()).unwrap());
    }

    #[tokio::test]
    async fn deregistering_an_absent_key_is_a_noop() {
        let registry = TimerRegistry::new();
        assert!(!registry.deregister(&key()).unwrap());
        assert!(registry.is_empty().unwrap());
    }

    #[tokio::test]
    async fn with_timer_misses_absent_keys() {
        let registry = TimerRegistry::new();
        assert!(registry
            .with_timer(&key(), |t| t.initial_seconds())
            .unwrap()
            .is_none());

        registry.register(key(), state()).unwrap();
        assert_eq!(
            registry.with_timer(&key(), |t| t.initial_seconds()).unwrap(),
            Some(90)
        );
    }

    #[tokio::test]
    async fn deregistration_aborts_the_watcher() {
        let registry = TimerRegistry::new();
        registry.register(key(), state()).unwrap();
        let watcher = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        registry.attach_watcher(&key(), watcher).unwrap();
        registry.deregister(&key()).unwrap();

        let timers = registry.lock().unwrap();
        assert!(timers.is_empty());
    }

    #[test]
    fn custom_id_round_trips() {
        let key = key();
        for action in [TimerAction::TogglePause, TimerAction::End] {
            let encoded = key.custom_id(action);
            assert_eq!(TimerKey::from_custom_id(&encoded), Some((action, key)));
        }
    }

    #[test]
    fn malformed_custom_ids_are_rejected() {
        for bad in [
            "team_select:first",
            "timer:toggle",
            "timer:restart:10:20:30",
            "timer:end:0:20:30",
            "timer:end:10:20:30:40",
            "timer:end:ten:20:30",
        ] {
            assert_eq!(TimerKey::from_custom_id(bad), None);
        }
    }
}
