//! Mini bar

use super::{play_label, UNKNOWN_COMPOSER, UNKNOWN_TITLE};
use crate::orchestrator::PlaybackOrchestrator;
use crate::timeline::VirtualTimeline;
use crate::types::{PlayerMode, PlayerState};

#[derive(Debug, Clone, PartialEq)]
pub struct MiniBarView {
    pub title: String,
    /// Composer, followed by ` • performer` when known
    pub subtitle: String,
    pub artwork: Option<String>,
    pub is_playing: bool,
    pub play_label: &'static str,
    /// Bar fill, 0-100
    pub progress_percent: f64,
    pub timeline: VirtualTimeline,
}

impl MiniBarView {
    /// Present only in mini mode
    pub fn from_state(state: &PlayerState) -> Option<Self> {
        if state.mode != PlayerMode::Mini {
            return None;
        }

        let composer = state.composer.as_deref().unwrap_or(UNKNOWN_COMPOSER);
        let subtitle = match state.performer.as_deref() {
            Some(performer) => format!("{composer} • {performer}"),
            None => composer.to_string(),
        };
        let timeline = state.timeline();

        Some(Self {
            title: state
                .title
                .clone()
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            subtitle,
            artwork: state.artwork.clone(),
            is_playing: state.is_playing,
            play_label: play_label(state.is_playing),
            progress_percent: timeline.progress_percent.min(100.0),
            timeline,
        })
    }
}

/// Switch to the immersive view
pub fn expand(player: &mut PlaybackOrchestrator) {
    player.set_mode(PlayerMode::Immersive);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mini_state() -> PlayerState {
        let mut state = PlayerState::default();
        state.mode = PlayerMode::Mini;
        state.src = "abc".to_string();
        state.current_time = 45.0;
        state.duration = 300.0;
        state.start_seconds = Some(30.0);
        state.end_seconds = Some(90.0);
        state
    }

    #[test]
    fn hidden_outside_mini_mode() {
        let mut state = mini_state();
        state.mode = PlayerMode::Immersive;
        assert!(MiniBarView::from_state(&state).is_none());
    }

    #[test]
    fn subtitle_fallbacks() {
        let mut state = mini_state();
        let view = MiniBarView::from_state(&state).unwrap();
        assert_eq!(view.subtitle, "Unknown Composer");
        assert_eq!(view.title, "Unknown Title");

        state.composer = Some("Chopin".to_string());
        state.performer = Some("Argerich".to_string());
        let view = MiniBarView::from_state(&state).unwrap();
        assert_eq!(view.subtitle, "Chopin • Argerich");
    }

    #[test]
    fn progress_follows_window() {
        let view = MiniBarView::from_state(&mini_state()).unwrap();
        assert_eq!(view.progress_percent, 25.0);
        assert_eq!(view.play_label, "Play");
    }

    #[test]
    fn bar_fill_stops_at_full() {
        let mut state = mini_state();
        state.current_time = 95.0;
        let view = MiniBarView::from_state(&state).unwrap();
        assert_eq!(view.progress_percent, 100.0);
        assert!(view.timeline.progress_percent > 100.0);
    }
}
