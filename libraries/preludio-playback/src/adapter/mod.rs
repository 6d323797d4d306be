//! Media adapter with lazy mount
//!
//! The adapter renders a placeholder until the first time it is asked to
//! play, then constructs the provider embed and keeps it alive across
//! pauses. Providers without an embed render an "unsupported" view and
//! never construct anything.

mod embed;
mod simulated;
mod youtube;

pub use embed::{EmbedEvent, EmbedFactory, EmbedKind, EmbedPlayer, EmbedState, LoadOptions};
pub use simulated::{SimulatedEmbed, SimulatedEmbedFactory, SimulatedEmbedHandle};

use crate::error::AdapterError;
use crate::types::{PlayerState, Provider};
use std::rc::Rc;
use std::time::Duration;
use tracing::{error, info};
use youtube::YouTubeAdapter;

/// Pending seek handed to the adapter
///
/// The sequence number distinguishes two seeks to the same second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekTrigger {
    pub seconds: f64,
    pub sequence: u64,
}

/// Position a remounted source picks up from
///
/// Only honored while the playback id is unchanged; a new play request
/// starts from the window start as usual.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResumePoint {
    pub playback_id: u64,
    pub seconds: f64,
}

/// Inputs of the adapter, derived from the orchestrator state
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterProps {
    pub src: String,
    pub platform: Provider,
    pub is_playing: bool,
    pub volume: u8,
    pub seek: Option<SeekTrigger>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub playback_id: u64,
}

impl AdapterProps {
    pub fn from_state(state: &PlayerState, seek: Option<SeekTrigger>) -> Self {
        Self {
            src: state.src.clone(),
            platform: state.platform,
            is_playing: state.is_playing,
            volume: state.volume,
            seek,
            start_time: state.start_seconds,
            end_time: state.end_seconds,
            playback_id: state.playback_id,
        }
    }
}

/// Notifications from the adapter back to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterEvent {
    Ready { duration: f64 },
    Progress { current_time: f64 },
    Duration { duration: f64 },
    StateChange { is_playing: bool },
    Ended,
    Error(AdapterError),
}

/// What the adapter currently renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterView {
    /// No adapter mounted
    Empty,

    /// Embed not constructed yet
    Placeholder,

    /// Provider has no embed
    Unsupported(Provider),

    /// Embed constructed
    Embed(EmbedKind),
}

enum MountState {
    Unmounted,
    Unsupported,
    Mounted(YouTubeAdapter),
}

/// Per-source adapter owned by the controller
pub struct AudioAdapter {
    provider: Provider,
    factory: Rc<dyn EmbedFactory>,
    poll_interval: Duration,
    mount: MountState,
    resume_at: Option<ResumePoint>,
    events: Vec<AdapterEvent>,
}

impl AudioAdapter {
    pub fn new(provider: Provider, factory: Rc<dyn EmbedFactory>, poll_interval: Duration) -> Self {
        let mount = if provider.supports_embed() {
            MountState::Unmounted
        } else {
            MountState::Unsupported
        };
        Self {
            provider,
            factory,
            poll_interval,
            mount,
            resume_at: None,
            events: Vec::new(),
        }
    }

    /// Start the first load at a restored position instead of the window start
    #[must_use]
    pub fn with_resume_at(mut self, resume_at: Option<ResumePoint>) -> Self {
        self.resume_at = resume_at;
        self
    }

    /// Apply new props; mounts the embed on the first play
    pub fn update(&mut self, props: &AdapterProps) {
        match &mut self.mount {
            MountState::Unsupported => {}
            MountState::Unmounted => {
                if props.is_playing {
                    self.mount_embed(props);
                }
            }
            MountState::Mounted(driver) => driver.update(props),
        }
    }

    /// Advance time: pumps embed events and progress polling
    pub fn tick(&mut self, elapsed: Duration) {
        if let MountState::Mounted(driver) = &mut self.mount {
            driver.tick(elapsed);
        }
    }

    pub fn drain_events(&mut self) -> Vec<AdapterEvent> {
        let mut events = std::mem::take(&mut self.events);
        if let MountState::Mounted(driver) = &mut self.mount {
            events.extend(driver.drain_events());
        }
        events
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.mount, MountState::Mounted(_))
    }

    pub fn view(&self) -> AdapterView {
        match &self.mount {
            MountState::Unmounted => AdapterView::Placeholder,
            MountState::Unsupported => AdapterView::Unsupported(self.provider),
            MountState::Mounted(_) => AdapterView::Embed(EmbedKind::YouTube),
        }
    }

    fn mount_embed(&mut self, props: &AdapterProps) {
        let Some(kind) = self.provider.embed_kind() else {
            self.mount = MountState::Unsupported;
            return;
        };

        match self.factory.create(kind) {
            Ok(embed) => {
                info!(src = %props.src, provider = %self.provider, "Mounting embed");
                let mut driver = match kind {
                    EmbedKind::YouTube => {
                        YouTubeAdapter::new(embed, self.poll_interval, self.resume_at.take())
                    }
                };
                driver.update(props);
                self.mount = MountState::Mounted(driver);
            }
            Err(e) => {
                error!(src = %props.src, error = %e, "Failed to create embed");
                self.events.push(AdapterEvent::Error(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(is_playing: bool) -> AdapterProps {
        AdapterProps {
            src: "abc".to_string(),
            platform: Provider::YouTube,
            is_playing,
            volume: 100,
            seek: None,
            start_time: None,
            end_time: None,
            playback_id: 1,
        }
    }

    fn adapter(factory: &SimulatedEmbedFactory, provider: Provider) -> AudioAdapter {
        AudioAdapter::new(
            provider,
            Rc::new(factory.clone()),
            Duration::from_millis(500),
        )
    }

    #[test]
    fn placeholder_until_first_play() {
        let factory = SimulatedEmbedFactory::new().with_media("abc", 120.0);
        let mut adapter = adapter(&factory, Provider::YouTube);

        adapter.update(&props(false));
        assert_eq!(adapter.view(), AdapterView::Placeholder);
        assert_eq!(factory.created(), 0);

        adapter.update(&props(true));
        assert_eq!(adapter.view(), AdapterView::Embed(EmbedKind::YouTube));
        assert_eq!(factory.created(), 1);
    }

    #[test]
    fn pause_keeps_embed() {
        let factory = SimulatedEmbedFactory::new().with_media("abc", 120.0);
        let mut adapter = adapter(&factory, Provider::YouTube);

        adapter.update(&props(true));
        adapter.update(&props(false));
        adapter.update(&props(true));

        assert!(adapter.is_mounted());
        assert_eq!(factory.created(), 1);
    }

    #[test]
    fn unsupported_provider_never_mounts() {
        let factory = SimulatedEmbedFactory::new();
        let mut adapter = adapter(&factory, Provider::Spotify);

        adapter.update(&AdapterProps {
            platform: Provider::Spotify,
            ..props(true)
        });

        assert_eq!(adapter.view(), AdapterView::Unsupported(Provider::Spotify));
        assert_eq!(factory.created(), 0);
    }

    #[test]
    fn factory_failure_reports_error() {
        let factory = SimulatedEmbedFactory::new();
        factory.set_unavailable(true);
        let mut adapter = adapter(&factory, Provider::YouTube);

        adapter.update(&props(true));

        assert!(!adapter.is_mounted());
        assert_eq!(
            adapter.drain_events(),
            vec![AdapterEvent::Error(AdapterError::EmbedUnavailable(
                Provider::YouTube
            ))]
        );
    }
}
