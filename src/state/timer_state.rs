//! Countdown state machine for a single timer
//!
//! The phase enum is the one authoritative representation of remaining time:
//! a running timer carries its completion deadline, a paused timer carries a
//! frozen remaining span. Resuming recomputes the deadline from the frozen
//! span, so the total wall-clock time spent running until completion is
//! invariant under any number of pause/resume cycles.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serenity::all::MessageId;
use tokio::time::Instant;

use crate::render::{self, Attribution, DisplayStyle};

/// Threshold for the one-time "1 minute left" notification.
pub const ONE_MINUTE_WARNING: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
enum Clock {
    /// Counting down toward `end_at`.
    Running { end_at: Instant },
    /// Frozen; `remaining` does not shrink while paused.
    Paused { remaining: Duration },
    /// The deadline passed naturally. Terminal.
    Finished,
    /// A user stopped the timer explicitly. Terminal.
    Ended,
}

/// What the expiry watcher should do after one per-second check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStep {
    /// Nothing crossed a threshold (or the timer is paused/terminal).
    Idle,
    /// The one-minute threshold was crossed for the first time.
    Warn,
    /// The deadline passed; the timer is now Finished.
    Expired,
}

/// Mutable record for one active timer.
#[derive(Debug)]
pub struct TimerState {
    /// Immutable after creation; only normalizes the progress bar fill.
    initial: Duration,
    clock: Clock,
    /// Latched once the one-minute warning has been sent. Never reset.
    warned: bool,
    /// When the current pause began. Kept for audit, not used in accounting.
    paused_at: Option<DateTime<Utc>>,
    /// Display attribution, captured at creation.
    pub who: Attribution,
    /// The rendered display message, once the first response has been posted.
    pub message_id: Option<MessageId>,
}

impl TimerState {
    /// Creates a Running timer whose deadline is `duration` from now.
    pub fn new(duration: Duration, who: Attribution) -> Self {
        Self {
            initial: duration,
            clock: Clock::Running {
                end_at: Instant::now() + duration,
            },
            warned: false,
            paused_at: None,
            who,
            message_id: None,
        }
    }

    pub fn initial_seconds(&self) -> u64 {
        self.initial.as_secs()
    }

    /// Authoritative remaining time for the current phase.
    pub fn remaining(&self) -> Duration {
        match self.clock {
            Clock::Running { end_at } => end_at.saturating_duration_since(Instant::now()),
            Clock::Paused { remaining } => remaining,
            Clock::Finished | Clock::Ended => Duration::ZERO,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.clock, Clock::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.clock, Clock::Paused { .. })
    }

    /// Finished and Ended admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self.clock, Clock::Finished | Clock::Ended)
    }

    pub fn paused_at(&self) -> Option<DateTime<Utc>> {
        self.paused_at
    }

    /// Running -> Paused, freezing the remaining time. Returns whether the
    /// transition applied.
    pub fn pause(&mut self) -> bool {
        match self.clock {
            Clock::Running { end_at } => {
                self.clock = Clock::Paused {
                    remaining: end_at.saturating_duration_since(Instant::now()),
                };
                self.paused_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }

    /// Paused -> Running, pushing the deadline out by exactly the span that
    /// was spent paused. Returns whether the transition applied.
    pub fn resume(&mut self) -> bool {
        match self.clock {
            Clock::Paused { remaining } => {
                self.clock = Clock::Running {
                    end_at: Instant::now() + remaining,
                };
                self.paused_at = None;
                true
            }
            _ => false,
        }
    }

    /// Running or Paused -> Ended. Returns whether the transition applied.
    pub fn end(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.clock = Clock::Ended;
        true
    }

    /// One per-second check of the expiry watcher. Paused and terminal
    /// timers never advance toward a threshold; the warning latch guarantees
    /// `Warn` is produced at most once over the timer's whole life.
    pub fn expiry_step(&mut self) -> ExpiryStep {
        if !self.is_running() {
            return ExpiryStep::Idle;
        }
        let remaining = self.remaining();
        if remaining.is_zero() {
            self.clock = Clock::Finished;
            return ExpiryStep::Expired;
        }
        if remaining <= ONE_MINUTE_WARNING && !self.warned {
            self.warned = true;
            return ExpiryStep::Warn;
        }
        ExpiryStep::Idle
    }

    /// Styling for the current phase.
    pub fn display_style(&self) -> DisplayStyle {
        match self.clock {
            Clock::Running { .. } => render::RUNNING,
            Clock::Paused { .. } => render::PAUSED,
            Clock::Finished => render::FINISHED,
            Clock::Ended => render::ENDED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn attribution() -> Attribution {
        Attribution {
            owner_name: "speaker".to_string(),
            owner_face: "https://cdn.example/speaker.png".to_string(),
            starter_name: "chair".to_string(),
            starter_face: "https://cdn.example/chair.png".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn new_timer_runs_with_full_remaining() {
        let timer = TimerState::new(Duration::from_secs(90), attribution());
        assert!(timer.is_running());
        assert_eq!(timer.remaining(), Duration::from_secs(90));
        assert_eq!(timer.display_style(), render::RUNNING);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_remaining_time() {
        let mut timer = TimerState::new(Duration::from_secs(90), attribution());
        advance(Duration::from_secs(30)).await;
        assert!(timer.pause());
        assert_eq!(timer.remaining(), Duration::from_secs(60));
        assert!(timer.paused_at().is_some());

        // An arbitrarily long pause does not consume running time.
        advance(Duration::from_secs(1000)).await;
        assert_eq!(timer.remaining(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn resume_retargets_the_deadline() {
        let mut timer = TimerState::new(Duration::from_secs(90), attribution());
        advance(Duration::from_secs(30)).await;
        assert!(timer.pause());
        advance(Duration::from_secs(10)).await;
        assert!(timer.resume());
        assert_eq!(timer.remaining(), Duration::from_secs(60));

        advance(Duration::from_secs(60)).await;
        assert_eq!(timer.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn running_time_until_expiry_is_invariant_under_pausing() {
        let mut timer = TimerState::new(Duration::from_secs(90), attribution());
        let mut running_clock = Duration::ZERO;
        for pause_span in [5, 50, 500] {
            advance(Duration::from_secs(20)).await;
            running_clock += Duration::from_secs(20);
            assert!(timer.pause());
            advance(Duration::from_secs(pause_span)).await;
            assert!(timer.resume());
        }
        assert_eq!(timer.remaining(), Duration::from_secs(90) - running_clock);

        advance(Duration::from_secs(90) - running_clock).await;
        assert_eq!(timer.expiry_step(), ExpiryStep::Expired);
        assert!(timer.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_resume_reject_wrong_phases() {
        let mut timer = TimerState::new(Duration::from_secs(30), attribution());
        assert!(!timer.resume());
        assert!(timer.pause());
        assert!(!timer.pause());
        assert!(timer.resume());
    }

    #[tokio::test(start_paused = true)]
    async fn end_is_idempotent_and_terminal() {
        let mut timer = TimerState::new(Duration::from_secs(30), attribution());
        assert!(timer.end());
        assert!(!timer.end());
        assert!(!timer.pause());
        assert!(!timer.resume());
        assert_eq!(timer.remaining(), Duration::ZERO);
        assert_eq!(timer.display_style(), render::ENDED);
    }

    #[tokio::test(start_paused = true)]
    async fn warning_fires_exactly_once_across_pause_cycles() {
        let mut timer = TimerState::new(Duration::from_secs(90), attribution());
        advance(Duration::from_secs(31)).await;
        assert_eq!(timer.expiry_step(), ExpiryStep::Warn);

        // Bounce around the threshold: the latch keeps the count at one.
        assert!(timer.pause());
        assert_eq!(timer.expiry_step(), ExpiryStep::Idle);
        assert!(timer.resume());
        assert_eq!(timer.expiry_step(), ExpiryStep::Idle);

        advance(Duration::from_secs(59)).await;
        assert_eq!(timer.expiry_step(), ExpiryStep::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_timer_never_expires() {
        let mut timer = TimerState::new(Duration::from_secs(30), attribution());
        assert!(timer.pause());
        advance(Duration::from_secs(3600)).await;
        assert_eq!(timer.expiry_step(), ExpiryStep::Idle);
        assert!(timer.is_paused());
        assert_eq!(timer.remaining(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_timer_reports_finished_style() {
        let mut timer = TimerState::new(Duration::from_secs(45), attribution());
        advance(Duration::from_secs(44)).await;
        assert_eq!(timer.expiry_step(), ExpiryStep::Warn);
        advance(Duration::from_secs(1)).await;
        assert_eq!(timer.expiry_step(), ExpiryStep::Expired);
        assert_eq!(timer.display_style(), render::FINISHED);
        assert_eq!(timer.expiry_step(), ExpiryStep::Idle);
    }
}
