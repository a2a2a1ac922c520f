//! State management module
//!
//! This module contains the timer engine's state: the per-timer countdown
//! state machine, the shared registry keyed by timer identity, and the
//! process-wide application state that owns the registry.

pub mod app_state;
pub mod registry;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use registry::{TimerAction, TimerEntry, TimerKey, TimerRegistry};
pub use timer_state::{ExpiryStep, TimerState};
