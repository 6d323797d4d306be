//! Presentation surfaces
//!
//! View models for the persistent mini bar and the full-screen immersive
//! view. Both are pure functions of [`PlayerState`](crate::PlayerState);
//! their actions only call into the orchestrator.

pub mod immersive;
pub mod mini;

pub use immersive::{Attribution, ImmersiveView, Scrubber};
pub use mini::MiniBarView;

use crate::orchestrator::PlaybackOrchestrator;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_COMPOSER: &str = "Unknown Composer";

/// Label of the play/pause button
pub fn play_label(is_playing: bool) -> &'static str {
    if is_playing {
        "Pause"
    } else {
        "Play"
    }
}

/// Seek by `delta` seconds, clamped to the trimmed window
pub fn skip_by(player: &mut PlaybackOrchestrator, delta: f64) {
    let target = player.timeline().skip_target(delta);
    player.seek_to(target);
}

pub fn skip_backward(player: &mut PlaybackOrchestrator) {
    let step = player.config().skip_seconds;
    skip_by(player, -step);
}

pub fn skip_forward(player: &mut PlaybackOrchestrator) {
    let step = player.config().skip_seconds;
    skip_by(player, step);
}

pub fn toggle(player: &mut PlaybackOrchestrator) {
    player.toggle_play();
}
