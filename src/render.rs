//! Timer display rendering
//!
//! Pure construction of the live countdown embed: the `HH:MM:SS` clock, the
//! proportional progress bar and the phase styling. Nothing in this module
//! touches the network or the registry, so identical inputs always produce
//! an identical payload and the tick loop can re-render idempotently.

use serenity::all::{CreateEmbed, CreateEmbedFooter};

/// Width of the progress bar in cells.
pub const BAR_CELLS: u64 = 25;

/// Signature color of the community, used by the welcome and reporting embeds.
pub const COMMUNITY_COLOR: u32 = 0xEDD6B1;

/// Status line and embed color for one rendering of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayStyle {
    pub status: &'static str,
    pub color: u32,
}

/// Shown on the very first response, before the first tick lands.
pub const STARTING: DisplayStyle = DisplayStyle {
    status: "Starting...",
    color: 0x3498db,
};

pub const RUNNING: DisplayStyle = DisplayStyle {
    status: "Running ⏳",
    color: 0x2ecc71,
};

pub const PAUSED: DisplayStyle = DisplayStyle {
    status: "Paused ⏸️",
    color: 0xffa500,
};

pub const FINISHED: DisplayStyle = DisplayStyle {
    status: "Finished ✅",
    color: 0xe74c3c,
};

pub const ENDED: DisplayStyle = DisplayStyle {
    status: "Ended ⏹️",
    color: 0x717d7e,
};

/// Who a timer is about and who started it, captured once at creation.
#[derive(Debug, Clone)]
pub struct Attribution {
    pub owner_name: String,
    pub owner_face: String,
    pub starter_name: String,
    pub starter_face: String,
}

/// Zero-padded `HH:MM:SS` clock string.
pub fn format_clock(remaining_seconds: u64) -> String {
    let hours = remaining_seconds / 3600;
    let minutes = (remaining_seconds % 3600) / 60;
    let seconds = remaining_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Number of filled cells for a bar normalized against the initial duration.
///
/// A zero-length initial duration renders an empty bar rather than dividing
/// by zero.
pub fn filled_cells(remaining_seconds: u64, initial_seconds: u64) -> u64 {
    if initial_seconds == 0 {
        return 0;
    }
    let ratio = remaining_seconds.min(initial_seconds) as f64 / initial_seconds as f64;
    (BAR_CELLS as f64 * ratio).round() as u64
}

/// Fixed-width proportional progress bar, filled from the left.
pub fn progress_bar(remaining_seconds: u64, initial_seconds: u64) -> String {
    let filled = filled_cells(remaining_seconds, initial_seconds) as usize;
    let empty = BAR_CELLS as usize - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// The countdown embed shown on the timer's rendered message.
pub fn timer_embed(
    remaining_seconds: u64,
    initial_seconds: u64,
    style: DisplayStyle,
    who: &Attribution,
) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("Speech Timer For {}", who.owner_name))
        .description(format!(
            "**Time Remaining:**\n# {}\n`{}`",
            format_clock(remaining_seconds),
            progress_bar(remaining_seconds, initial_seconds)
        ))
        .color(style.color)
        .thumbnail(who.owner_face.clone())
        .field("Status", style.status, false)
        .footer(
            CreateEmbedFooter::new(format!("Timer started by {}", who.starter_name))
                .icon_url(who.starter_face.clone()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(90), "00:01:30");
        assert_eq!(format_clock(4830), "01:20:30");
        assert_eq!(format_clock(36_000), "10:00:00");
    }

    #[test]
    fn bar_is_full_at_start_and_empty_at_zero() {
        assert_eq!(filled_cells(300, 300), BAR_CELLS);
        assert_eq!(filled_cells(0, 300), 0);
    }

    #[test]
    fn bar_handles_zero_initial_duration() {
        assert_eq!(filled_cells(10, 0), 0);
        assert_eq!(progress_bar(10, 0).chars().count(), BAR_CELLS as usize);
    }

    #[test]
    fn bar_never_exceeds_full_width() {
        // Remaining beyond the initial duration clamps instead of overflowing.
        assert_eq!(filled_cells(600, 300), BAR_CELLS);
    }

    #[test]
    fn bar_fill_is_monotonic() {
        let initial = 90;
        let mut last = BAR_CELLS;
        for remaining in (0..=initial).rev() {
            let filled = filled_cells(remaining, initial);
            assert!(filled <= last, "fill grew as remaining shrank");
            last = filled;
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn bar_width_is_constant() {
        for remaining in [0, 1, 149, 150] {
            assert_eq!(progress_bar(remaining, 150).chars().count(), BAR_CELLS as usize);
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(progress_bar(40, 90), progress_bar(40, 90));
        assert_eq!(format_clock(40), format_clock(40));
    }
}
