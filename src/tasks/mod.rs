//! Background tasks module
//!
//! This module contains the tasks that run alongside the gateway connection:
//! the shared per-second display refresh driver and the per-timer expiry
//! watchers.

pub mod expiry_watcher;
pub mod tick_loop;

// Re-export main functions
pub use expiry_watcher::expiry_watcher_task;
pub use tick_loop::display_refresh_task;
