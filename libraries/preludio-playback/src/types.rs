//! Core types for player orchestration

use crate::adapter::EmbedKind;
use crate::error::ValidationError;
use crate::timeline::VirtualTimeline;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Media provider a source identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Provider {
    #[default]
    #[serde(rename = "youtube")]
    YouTube,

    #[serde(rename = "spotify")]
    Spotify,

    #[serde(rename = "soundcloud")]
    SoundCloud,

    #[serde(rename = "apple-music")]
    AppleMusic,

    #[serde(rename = "audio-file")]
    AudioFile,

    #[serde(rename = "generic")]
    Generic,
}

impl Provider {
    pub const ALL: [Provider; 6] = [
        Provider::YouTube,
        Provider::Spotify,
        Provider::SoundCloud,
        Provider::AppleMusic,
        Provider::AudioFile,
        Provider::Generic,
    ];

    /// Wire name, as stored in snapshots and accepted in directives
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::YouTube => "youtube",
            Provider::Spotify => "spotify",
            Provider::SoundCloud => "soundcloud",
            Provider::AppleMusic => "apple-music",
            Provider::AudioFile => "audio-file",
            Provider::Generic => "generic",
        }
    }

    /// Human readable provider name
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::YouTube => "YouTube",
            Provider::Spotify => "Spotify",
            Provider::SoundCloud => "SoundCloud",
            Provider::AppleMusic => "Apple Music",
            Provider::AudioFile => "Audio File",
            Provider::Generic => "Source",
        }
    }

    /// Embedded player able to render this provider, if any
    ///
    /// Adding an embed for a new provider only requires a new arm here and a
    /// driver for the new [`EmbedKind`].
    pub fn embed_kind(self) -> Option<EmbedKind> {
        match self {
            Provider::YouTube => Some(EmbedKind::YouTube),
            Provider::Spotify
            | Provider::SoundCloud
            | Provider::AppleMusic
            | Provider::AudioFile
            | Provider::Generic => None,
        }
    }

    pub fn supports_embed(self) -> bool {
        self.embed_kind().is_some()
    }

    /// Label used for the attribution link when none was supplied
    pub fn default_label(self) -> Option<&'static str> {
        match self {
            Provider::YouTube => Some("Watch on YouTube"),
            _ => None,
        }
    }

    /// Canonical page for a source on this provider, when one can be derived
    pub fn watch_url(self, source_id: &str) -> Option<String> {
        if source_id.is_empty() {
            return None;
        }
        match self {
            Provider::YouTube => Some(format!("https://www.youtube.com/watch?v={source_id}")),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown provider: {s}"))
    }
}

/// Presentation mode of the session-wide player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerMode {
    /// Nothing shown
    #[default]
    Hidden,

    /// Compact bar
    Mini,

    /// Full-screen view
    Immersive,
}

impl PlayerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerMode::Hidden => "hidden",
            PlayerMode::Mini => "mini",
            PlayerMode::Immersive => "immersive",
        }
    }
}

impl fmt::Display for PlayerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hidden" => Ok(PlayerMode::Hidden),
            "mini" => Ok(PlayerMode::Mini),
            "immersive" => Ok(PlayerMode::Immersive),
            other => Err(format!("unknown player mode: {other}")),
        }
    }
}

/// Request to start (or restart) playback of a source
///
/// Every field except `source_id` is optional. On a same-source request,
/// omitted metadata keeps the current value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRequest {
    pub source_id: String,

    #[serde(default)]
    pub provider: Provider,

    #[serde(default)]
    pub start_seconds: Option<f64>,

    #[serde(default)]
    pub end_seconds: Option<f64>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub composer_name: Option<String>,

    #[serde(default)]
    pub performer: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub source_url: Option<String>,

    #[serde(default)]
    pub provider_label: Option<String>,
}

impl PlayRequest {
    pub fn new(source_id: impl Into<String>, provider: Provider) -> Self {
        Self {
            source_id: source_id.into(),
            provider,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, start: Option<f64>, end: Option<f64>) -> Self {
        self.start_seconds = start;
        self.end_seconds = end;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_composer(mut self, composer: impl Into<String>) -> Self {
        self.composer_name = Some(composer.into());
        self
    }

    #[must_use]
    pub fn with_performer(mut self, performer: impl Into<String>) -> Self {
        self.performer = Some(performer.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_provider_label(mut self, label: impl Into<String>) -> Self {
        self.provider_label = Some(label.into());
        self
    }

    /// Whether either trim bound was supplied
    pub fn has_bounds(&self) -> bool {
        self.start_seconds.is_some() || self.end_seconds.is_some()
    }

    /// Check the request against the configured limits
    ///
    /// Nothing is mutated when this fails.
    pub fn validate(&self, config: &PlayerConfig) -> Result<(), ValidationError> {
        if self.source_id.trim().is_empty() {
            return Err(ValidationError::EmptySourceId);
        }
        if self.source_id.len() > config.max_source_id_len {
            return Err(ValidationError::SourceIdTooLong {
                max: config.max_source_id_len,
            });
        }
        validate_bounds(self.start_seconds, self.end_seconds, config.max_seconds)
    }
}

/// Validate optional trim bounds
///
/// Each bound must be finite and within `[0, max]`, and the end must lie
/// strictly after the start (an absent start counts as zero).
pub(crate) fn validate_bounds(
    start: Option<f64>,
    end: Option<f64>,
    max: f64,
) -> Result<(), ValidationError> {
    for (field, value) in [("startSeconds", start), ("endSeconds", end)] {
        let Some(value) = value else { continue };
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if !(0.0..=max).contains(&value) {
            return Err(ValidationError::OutOfRange { field, value, max });
        }
    }

    if let Some(end) = end {
        let start = start.unwrap_or(0.0);
        if end <= start {
            return Err(ValidationError::InvalidRange { start, end });
        }
    }

    Ok(())
}

/// Snapshot of everything the player knows about the current session
///
/// Only [`PlaybackOrchestrator`](crate::PlaybackOrchestrator) mutates this;
/// consumers read it through `state()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub is_playing: bool,

    /// Absolute position in seconds
    pub current_time: f64,

    /// Full source length in seconds, 0 when unknown
    pub duration: f64,

    /// Provider-specific identifier, empty when nothing is loaded
    pub src: String,

    pub mode: PlayerMode,

    pub title: Option<String>,
    pub composer: Option<String>,
    pub performer: Option<String>,
    pub artwork: Option<String>,
    pub platform_url: Option<String>,
    pub platform_label: Option<String>,
    pub platform: Provider,

    /// Whether the mounted embed finished initializing
    pub is_ready: bool,

    /// 0-100
    pub volume: u8,

    pub start_seconds: Option<f64>,
    pub end_seconds: Option<f64>,

    /// Incremented on every play request and every restore
    pub playback_id: u64,
}

impl PlayerState {
    pub fn new(volume: u8) -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            src: String::new(),
            mode: PlayerMode::Hidden,
            title: None,
            composer: None,
            performer: None,
            artwork: None,
            platform_url: None,
            platform_label: None,
            platform: Provider::default(),
            is_ready: false,
            volume: volume.min(100),
            start_seconds: None,
            end_seconds: None,
            playback_id: 0,
        }
    }

    pub fn has_source(&self) -> bool {
        !self.src.is_empty()
    }

    /// Trimmed-window view of the current position
    pub fn timeline(&self) -> VirtualTimeline {
        VirtualTimeline::new(
            self.current_time,
            self.duration,
            self.start_seconds,
            self.end_seconds,
        )
    }

    pub(crate) fn clear_metadata(&mut self) {
        self.title = None;
        self.composer = None;
        self.performer = None;
        self.artwork = None;
        self.platform_url = None;
        self.platform_label = None;
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(PlayerConfig::default().default_volume)
    }
}

/// Configuration for the player core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Storage key the snapshot is kept under (default: `preludio_player_state`)
    pub storage_key: String,

    /// Volume before anything was persisted (0-100, default: 100)
    pub default_volume: u8,

    /// How often the embed driver reports progress (default: 500ms)
    pub progress_interval_ms: u64,

    /// Skip step of the presentation surfaces (default: 10s)
    pub skip_seconds: f64,

    /// Upper limit for trim bounds (default: 24h)
    pub max_seconds: f64,

    /// Upper limit for source identifiers in bytes (default: 2048)
    pub max_source_id_len: usize,
}

impl PlayerConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms.max(1))
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            storage_key: "preludio_player_state".to_string(),
            default_volume: 100,
            progress_interval_ms: 500,
            skip_seconds: 10.0,
            max_seconds: 86_400.0,
            max_source_id_len: 2048,
        }
    }
}
