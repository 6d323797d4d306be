//! Player Events
//!
//! Every observable change of the orchestrator is mirrored as an event so
//! hosts that cannot hold a borrow on the state (WASM, the CLI renderer) can
//! react after the fact. Events are queued and handed out by
//! `PlaybackOrchestrator::drain_events`.

use crate::types::PlayerMode;
use serde::{Deserialize, Serialize};

/// Events emitted by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PlayerEvent {
    /// A play request was accepted
    PlaybackRequested {
        playback_id: u64,
        src: String,
        /// False when the request restarted the current source
        source_changed: bool,
    },

    /// Playing flag flipped
    PlayStateChanged { is_playing: bool },

    /// Presentation mode changed
    ModeChanged { mode: PlayerMode },

    /// The mounted embed finished initializing
    Ready { duration: f64 },

    /// Absolute position moved (progress report or seek)
    PositionChanged { current_time: f64 },

    /// Source length became known or changed
    DurationChanged { duration: f64 },

    /// Volume changed (0-100)
    VolumeChanged { level: u8 },

    /// The player was dismissed and the source cleared
    SourceCleared,

    /// State was rehydrated from a persisted snapshot
    Restored { playback_id: u64 },

    /// Message the host should surface to the user
    Notice { message: String },
}

impl PlayerEvent {
    /// Whether this event carries a message meant for the user
    pub fn is_notice(&self) -> bool {
        matches!(self, PlayerEvent::Notice { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_tagged() {
        let event = PlayerEvent::PlaybackRequested {
            playback_id: 3,
            src: "abc".to_string(),
            source_changed: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "playbackRequested");
        assert_eq!(json["playbackId"], 3);
        assert_eq!(json["sourceChanged"], true);
    }

    #[test]
    fn unit_event_serializes() {
        let json = serde_json::to_string(&PlayerEvent::SourceCleared).unwrap();
        assert_eq!(json, r#"{"type":"sourceCleared"}"#);
    }

    #[test]
    fn notice_detection() {
        assert!(PlayerEvent::Notice {
            message: "x".to_string()
        }
        .is_notice());
        assert!(!PlayerEvent::SourceCleared.is_notice());
    }
}
