//! Virtual timeline over a trimmed source
//!
//! Presentation surfaces show time relative to the trimmed window
//! `[start_offset, end_cap]` while the embed works in absolute seconds.

/// Window-relative view of an absolute position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualTimeline {
    /// Absolute position the view was computed from
    pub current_time: f64,

    /// Window start, `startSeconds` or 0
    pub start_offset: f64,

    /// Window end, `endSeconds` or the full duration
    pub end_cap: f64,

    /// Window length, never negative
    pub display_duration: f64,

    /// Position inside the window, never negative
    pub display_time: f64,

    /// Share of the window played, in percent; exceeds 100 past the end bound
    pub progress_percent: f64,
}

impl VirtualTimeline {
    pub fn new(current_time: f64, duration: f64, start: Option<f64>, end: Option<f64>) -> Self {
        let current_time = finite_or_zero(current_time);
        let start_offset = start.map_or(0.0, finite_or_zero);
        let end_cap = end.map_or_else(|| finite_or_zero(duration), finite_or_zero);

        let display_duration = (end_cap - start_offset).max(0.0);
        let display_time = (current_time - start_offset).max(0.0);
        let progress_percent = if display_duration > 0.0 {
            display_time / display_duration * 100.0
        } else {
            0.0
        };

        Self {
            current_time,
            start_offset,
            end_cap,
            display_duration,
            display_time,
            progress_percent,
        }
    }

    /// Whether the window has a usable length
    pub fn has_extent(&self) -> bool {
        self.end_cap > self.start_offset
    }

    /// Clamp an absolute position into the window
    ///
    /// While the window has no extent yet (duration unknown, no end bound)
    /// only the lower bound applies.
    pub fn clamp_absolute(&self, seconds: f64) -> f64 {
        let seconds = finite_or_zero(seconds);
        let upper = if self.has_extent() {
            self.end_cap
        } else {
            f64::INFINITY
        };
        seconds.min(upper).max(self.start_offset)
    }

    /// Absolute target for a relative skip (negative skips backwards)
    pub fn skip_target(&self, delta: f64) -> f64 {
        self.clamp_absolute(self.current_time + delta)
    }

    /// Absolute position for a window-relative one
    pub fn to_absolute(&self, display_time: f64) -> f64 {
        self.clamp_absolute(display_time + self.start_offset)
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Format seconds as `m:ss`
///
/// Zero, negative and non-finite inputs render as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}
