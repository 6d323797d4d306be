//! In-process embed with a simulated clock
//!
//! Behaves like the iframe player as far as the driver can tell: readiness
//! arrives after a bootstrap delay, state changes are reported
//! asynchronously, and unknown videos fail with error 100. Used by the CLI
//! and by tests, which inspect it through [`SimulatedEmbedHandle`].

use super::embed::{EmbedEvent, EmbedFactory, EmbedKind, EmbedPlayer, EmbedState, LoadOptions};
use crate::error::AdapterError;
use crate::types::Provider;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

const NOT_FOUND: i32 = 100;

#[derive(Debug)]
struct EmbedShared {
    catalog: Catalog,
    bootstrap: Duration,
    booted_for: Duration,
    ready_sent: bool,

    video_id: Option<String>,
    duration: f64,
    position: f64,
    state: EmbedState,
    events: VecDeque<EmbedEvent>,

    loads: Vec<LoadOptions>,
    cues: Vec<LoadOptions>,
    seeks: Vec<f64>,
    volumes: Vec<u8>,
    destroyed: bool,
}

impl EmbedShared {
    fn set_state(&mut self, state: EmbedState) {
        if self.state != state {
            self.state = state;
            self.events.push_back(EmbedEvent::StateChange(state));
        }
    }

    fn open(&mut self, options: &LoadOptions) -> bool {
        match self.catalog.duration_of(&options.video_id) {
            Some(duration) => {
                self.video_id = Some(options.video_id.clone());
                self.duration = duration;
                self.position = options.start_seconds.clamp(0.0, duration);
                true
            }
            None => {
                self.video_id = None;
                self.duration = 0.0;
                self.position = 0.0;
                self.state = EmbedState::Unstarted;
                self.events.push_back(EmbedEvent::Error(NOT_FOUND));
                false
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Catalog {
    media: HashMap<String, f64>,
    fallback: Option<f64>,
}

impl Catalog {
    fn duration_of(&self, video_id: &str) -> Option<f64> {
        self.media.get(video_id).copied().or(self.fallback)
    }
}

/// Simulated embedded player
#[derive(Debug)]
pub struct SimulatedEmbed {
    shared: Rc<RefCell<EmbedShared>>,
}

impl EmbedPlayer for SimulatedEmbed {
    fn load_video(&mut self, options: &LoadOptions) -> Result<(), AdapterError> {
        let mut shared = self.shared.borrow_mut();
        if shared.destroyed {
            return Err(AdapterError::LoadFailed {
                video_id: options.video_id.clone(),
                message: "embed was destroyed".to_string(),
            });
        }
        shared.loads.push(options.clone());
        if shared.open(options) {
            shared.set_state(EmbedState::Buffering);
            shared.set_state(EmbedState::Playing);
        }
        Ok(())
    }

    fn cue_video(&mut self, options: &LoadOptions) -> Result<(), AdapterError> {
        let mut shared = self.shared.borrow_mut();
        if shared.destroyed {
            return Err(AdapterError::LoadFailed {
                video_id: options.video_id.clone(),
                message: "embed was destroyed".to_string(),
            });
        }
        shared.cues.push(options.clone());
        if shared.open(options) {
            shared.set_state(EmbedState::Cued);
        }
        Ok(())
    }

    fn play_video(&mut self) {
        let mut shared = self.shared.borrow_mut();
        if shared.video_id.is_none() {
            return;
        }
        if shared.state == EmbedState::Ended {
            shared.position = 0.0;
        }
        shared.set_state(EmbedState::Playing);
    }

    fn pause_video(&mut self) {
        let mut shared = self.shared.borrow_mut();
        if shared.state == EmbedState::Playing || shared.state == EmbedState::Buffering {
            shared.set_state(EmbedState::Paused);
        }
    }

    fn seek_to(&mut self, seconds: f64, _allow_seek_ahead: bool) {
        let mut shared = self.shared.borrow_mut();
        shared.seeks.push(seconds);
        let upper = if shared.duration > 0.0 {
            shared.duration
        } else {
            f64::MAX
        };
        shared.position = seconds.clamp(0.0, upper);
    }

    fn set_volume(&mut self, level: u8) {
        self.shared.borrow_mut().volumes.push(level);
    }

    fn current_time(&self) -> f64 {
        self.shared.borrow().position
    }

    fn duration(&self) -> f64 {
        self.shared.borrow().duration
    }

    fn player_state(&self) -> EmbedState {
        self.shared.borrow().state
    }

    fn video_id(&self) -> Option<String> {
        self.shared.borrow().video_id.clone()
    }

    fn poll_event(&mut self) -> Option<EmbedEvent> {
        self.shared.borrow_mut().events.pop_front()
    }

    fn advance(&mut self, elapsed: Duration) {
        let mut shared = self.shared.borrow_mut();
        if shared.destroyed {
            return;
        }

        if !shared.ready_sent {
            shared.booted_for += elapsed;
            if shared.booted_for >= shared.bootstrap {
                shared.ready_sent = true;
                shared.events.push_back(EmbedEvent::Ready);
            }
            return;
        }

        if shared.state == EmbedState::Playing {
            shared.position += elapsed.as_secs_f64();
            if shared.duration > 0.0 && shared.position >= shared.duration {
                shared.position = shared.duration;
                shared.set_state(EmbedState::Ended);
            }
        }
    }

    fn destroy(&mut self) {
        let mut shared = self.shared.borrow_mut();
        shared.destroyed = true;
        shared.state = EmbedState::Unstarted;
        shared.events.clear();
    }
}

/// Read-only view onto a simulated embed
#[derive(Debug, Clone)]
pub struct SimulatedEmbedHandle {
    shared: Rc<RefCell<EmbedShared>>,
}

impl SimulatedEmbedHandle {
    pub fn loads(&self) -> Vec<LoadOptions> {
        self.shared.borrow().loads.clone()
    }

    pub fn cues(&self) -> Vec<LoadOptions> {
        self.shared.borrow().cues.clone()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.shared.borrow().seeks.clone()
    }

    pub fn volumes(&self) -> Vec<u8> {
        self.shared.borrow().volumes.clone()
    }

    pub fn position(&self) -> f64 {
        self.shared.borrow().position
    }

    pub fn state(&self) -> EmbedState {
        self.shared.borrow().state
    }

    pub fn video_id(&self) -> Option<String> {
        self.shared.borrow().video_id.clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.borrow().destroyed
    }

    /// Make the embed report an error code, as the iframe API would
    pub fn inject_error(&self, code: i32) {
        self.shared
            .borrow_mut()
            .events
            .push_back(EmbedEvent::Error(code));
    }
}

#[derive(Debug, Default)]
struct FactoryState {
    catalog: Catalog,
    bootstrap: Duration,
    unavailable: bool,
    created: Vec<SimulatedEmbedHandle>,
}

/// Builds [`SimulatedEmbed`]s over a fixed media catalog
///
/// Clones share the catalog and the list of created embeds.
#[derive(Debug, Clone, Default)]
pub struct SimulatedEmbedFactory {
    inner: Rc<RefCell<FactoryState>>,
}

impl SimulatedEmbedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a video and its length in seconds
    #[must_use]
    pub fn with_media(self, video_id: impl Into<String>, duration: f64) -> Self {
        self.inner
            .borrow_mut()
            .catalog
            .media
            .insert(video_id.into(), duration.max(0.0));
        self
    }

    /// Length used for videos missing from the catalog; without it they fail
    #[must_use]
    pub fn with_fallback_duration(self, duration: Option<f64>) -> Self {
        self.inner.borrow_mut().catalog.fallback = duration.map(|d| d.max(0.0));
        self
    }

    /// Delay between construction and readiness
    #[must_use]
    pub fn with_bootstrap(self, bootstrap: Duration) -> Self {
        self.inner.borrow_mut().bootstrap = bootstrap;
        self
    }

    /// Make `create` fail, as when the iframe API script is blocked
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.borrow_mut().unavailable = unavailable;
    }

    /// Number of embeds constructed so far
    pub fn created(&self) -> usize {
        self.inner.borrow().created.len()
    }

    pub fn embed(&self, index: usize) -> Option<SimulatedEmbedHandle> {
        self.inner.borrow().created.get(index).cloned()
    }

    pub fn latest(&self) -> Option<SimulatedEmbedHandle> {
        self.inner.borrow().created.last().cloned()
    }
}

impl EmbedFactory for SimulatedEmbedFactory {
    fn create(&self, kind: EmbedKind) -> Result<Box<dyn EmbedPlayer>, AdapterError> {
        let mut inner = self.inner.borrow_mut();
        if inner.unavailable {
            return Err(AdapterError::EmbedUnavailable(match kind {
                EmbedKind::YouTube => Provider::YouTube,
            }));
        }

        let shared = Rc::new(RefCell::new(EmbedShared {
            catalog: inner.catalog.clone(),
            bootstrap: inner.bootstrap,
            booted_for: Duration::ZERO,
            ready_sent: false,
            video_id: None,
            duration: 0.0,
            position: 0.0,
            state: EmbedState::Unstarted,
            events: VecDeque::new(),
            loads: Vec::new(),
            cues: Vec::new(),
            seeks: Vec::new(),
            volumes: Vec::new(),
            destroyed: false,
        }));

        inner.created.push(SimulatedEmbedHandle {
            shared: Rc::clone(&shared),
        });
        Ok(Box::new(SimulatedEmbed { shared }))
    }
}
