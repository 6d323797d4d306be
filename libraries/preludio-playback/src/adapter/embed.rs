//! Embedded player abstraction
//!
//! Mirrors the surface of the YouTube iframe API that the driver relies on.
//! The browser host wraps the real iframe player, tests and the CLI use
//! [`SimulatedEmbed`](super::SimulatedEmbed).

use crate::error::AdapterError;
use std::time::Duration;

/// Embed families the adapter knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbedKind {
    YouTube,
}

/// Player state reported by the embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl EmbedState {
    /// Map the numeric state code of the iframe API
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(EmbedState::Unstarted),
            0 => Some(EmbedState::Ended),
            1 => Some(EmbedState::Playing),
            2 => Some(EmbedState::Paused),
            3 => Some(EmbedState::Buffering),
            5 => Some(EmbedState::Cued),
            _ => None,
        }
    }

    /// Play state implied by this embed state; transient states imply nothing
    pub fn is_playing(self) -> Option<bool> {
        match self {
            EmbedState::Playing => Some(true),
            EmbedState::Paused | EmbedState::Ended => Some(false),
            EmbedState::Unstarted | EmbedState::Buffering | EmbedState::Cued => None,
        }
    }
}

/// Asynchronous notification from the embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedEvent {
    Ready,
    StateChange(EmbedState),
    Error(i32),
}

/// Arguments for loading or cueing a video
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub video_id: String,
    pub start_seconds: f64,
    pub end_seconds: Option<f64>,
}

/// An embedded media player
///
/// Calls are fire-and-forget like the iframe API: results show up later as
/// [`EmbedEvent`]s returned by `poll_event`.
pub trait EmbedPlayer {
    /// Load and start playing
    fn load_video(&mut self, options: &LoadOptions) -> Result<(), AdapterError>;

    /// Load without starting playback
    fn cue_video(&mut self, options: &LoadOptions) -> Result<(), AdapterError>;

    fn play_video(&mut self);

    fn pause_video(&mut self);

    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool);

    /// 0-100
    fn set_volume(&mut self, level: u8);

    fn current_time(&self) -> f64;

    fn duration(&self) -> f64;

    fn player_state(&self) -> EmbedState;

    /// Identifier of the loaded video, if any
    fn video_id(&self) -> Option<String>;

    /// Next pending notification
    fn poll_event(&mut self) -> Option<EmbedEvent>;

    /// Let simulated clocks move forward; real embeds run on their own
    fn advance(&mut self, _elapsed: Duration) {}

    /// Release the embed; called once when the adapter is torn down
    fn destroy(&mut self) {}
}

/// Creates embeds on first mount
pub trait EmbedFactory {
    fn create(&self, kind: EmbedKind) -> Result<Box<dyn EmbedPlayer>, AdapterError>;
}
