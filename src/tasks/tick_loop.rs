//! Shared display refresh task
//!
//! One process-wide driver re-renders every registered timer's embed once per
//! second. It is spawned once at startup and runs for the process lifetime;
//! per-timer failures are absorbed inside [`TimerService::refresh`] so a
//! broken display can never stall the loop for the other timers.

use std::sync::Arc;
use std::time::Duration;

use serenity::http::Http;
use tokio::time::interval;
use tracing::{error, info};

use crate::services::timer::TimerService;
use crate::state::AppState;

pub async fn display_refresh_task(state: Arc<AppState>, http: Arc<Http>) {
    info!("Starting timer display refresh task");

    let service = TimerService::new(state.clone(), http);
    let mut interval = interval(Duration::from_secs(1));

    loop {
        interval.tick().await;

        let keys = match state.registry.keys() {
            Ok(keys) => keys,
            Err(e) => {
                error!("Failed to snapshot timer registry: {}", e);
                continue;
            }
        };

        for key in keys {
            service.refresh(&key).await;
        }
    }
}
