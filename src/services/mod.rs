//! Side-effectful services
//!
//! This module contains the operations that talk to Discord on behalf of the
//! bot: timer lifecycle orchestration, team-role assignment and the welcome
//! flow.

pub mod roles;
pub mod timer;
pub mod welcome;

// Re-export main types
pub use timer::{EndOutcome, TimerService, ToggleOutcome};
pub use welcome::BannerComposer;
