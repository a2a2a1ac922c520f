//! Per-timer expiry watcher task
//!
//! One watcher runs per active timer, spawned at creation. Each second it
//! asks the state machine whether a threshold was crossed: the one-minute
//! warning fires at most once thanks to the latch, and the zero threshold
//! finishes the timer. The watcher exits on its own once its timer leaves
//! the registry, and deregistration additionally aborts its handle, so the
//! two cleanup paths can race safely.

use std::sync::Arc;
use std::time::Duration;

use serenity::http::Http;
use tokio::time::interval;
use tracing::{debug, error};

use crate::services::timer::TimerService;
use crate::state::timer_state::{ExpiryStep, TimerState};
use crate::state::{AppState, TimerKey};

pub async fn expiry_watcher_task(state: Arc<AppState>, http: Arc<Http>, key: TimerKey) {
    debug!("Starting expiry watcher for {}", key);

    let service = TimerService::new(state.clone(), http);
    let mut interval = interval(Duration::from_secs(1));

    loop {
        interval.tick().await;

        let step = match state.registry.with_timer(&key, TimerState::expiry_step) {
            Ok(Some(step)) => step,
            // Deregistered elsewhere (ended, or display message deleted).
            Ok(None) => break,
            Err(e) => {
                error!("Expiry watcher lost access to timer {}: {}", key, e);
                break;
            }
        };

        match step {
            ExpiryStep::Idle => {}
            ExpiryStep::Warn => service.send_warning(&key).await,
            ExpiryStep::Expired => {
                service.finish(&key).await;
                break;
            }
        }
    }

    debug!("Expiry watcher for {} stopped", key);
}
