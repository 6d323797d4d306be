//! Immersive view

use super::{play_label, UNKNOWN_COMPOSER, UNKNOWN_TITLE};
use crate::orchestrator::PlaybackOrchestrator;
use crate::timeline::{format_time, VirtualTimeline};
use crate::types::{PlayerMode, PlayerState, Provider};

/// Link back to the source page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub url: String,
    pub label: String,
    pub provider: Provider,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImmersiveView {
    pub title: String,
    pub composer: String,
    pub performer: Option<String>,
    pub artwork: Option<String>,
    pub attribution: Option<Attribution>,
    pub is_playing: bool,
    pub play_label: &'static str,
    pub elapsed_label: String,
    pub total_label: String,
    /// Upper end of the seek bar, in window-relative seconds
    pub seek_max: f64,
    /// Current seek bar position; follows the drag while scrubbing
    pub seek_value: f64,
    pub timeline: VirtualTimeline,
}

impl ImmersiveView {
    /// Present only in immersive mode
    pub fn from_state(state: &PlayerState, scrubber: &Scrubber) -> Option<Self> {
        if state.mode != PlayerMode::Immersive {
            return None;
        }

        let timeline = state.timeline();
        let seek_value = if scrubber.is_dragging() {
            scrubber.drag_time
        } else {
            timeline.display_time
        };
        let total_label = if state.end_seconds.is_none() && state.duration == 0.0 {
            "--:--".to_string()
        } else {
            format_time(timeline.display_duration)
        };
        let seek_max = if timeline.display_duration > 0.0 {
            timeline.display_duration
        } else {
            100.0
        };

        let attribution = state.platform_url.as_ref().map(|url| Attribution {
            url: url.clone(),
            label: state
                .platform_label
                .clone()
                .unwrap_or_else(|| state.platform.display_name().to_string()),
            provider: state.platform,
        });

        Some(Self {
            title: state
                .title
                .clone()
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            composer: state
                .composer
                .clone()
                .unwrap_or_else(|| UNKNOWN_COMPOSER.to_string()),
            performer: state.performer.clone(),
            artwork: state.artwork.clone(),
            attribution,
            is_playing: state.is_playing,
            play_label: play_label(state.is_playing),
            elapsed_label: format_time(seek_value),
            total_label,
            seek_max,
            seek_value,
            timeline,
        })
    }
}

/// Drag state of the seek bar
///
/// While dragging, the bar follows the pointer and the embed is left alone;
/// the seek is issued once on release.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scrubber {
    dragging: bool,
    drag_time: f64,
}

impl Scrubber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin(&mut self, player: &PlaybackOrchestrator) {
        self.dragging = true;
        self.drag_time = player.timeline().display_time;
    }

    /// Move the drag position (window-relative seconds)
    pub fn update(&mut self, display_time: f64) {
        if self.dragging && display_time.is_finite() {
            self.drag_time = display_time.max(0.0);
        }
    }

    /// Release: seek to the absolute position of the drag
    pub fn end(&mut self, player: &mut PlaybackOrchestrator) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        let target = player.timeline().to_absolute(self.drag_time);
        player.seek_to(target);
    }

    pub fn cancel(&mut self) {
        self.dragging = false;
    }
}

/// Back to the mini bar
pub fn minimize(player: &mut PlaybackOrchestrator) {
    player.set_mode(PlayerMode::Mini);
}

/// Follow the attribution link; playback pauses first
///
/// Returns the URL the host should open.
pub fn open_attribution(player: &mut PlaybackOrchestrator) -> Option<String> {
    let url = player.state().platform_url.clone()?;
    if player.state().is_playing {
        player.pause();
    }
    Some(url)
}
