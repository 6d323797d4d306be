//! Playback orchestrator - session-wide player state
//!
//! Single owner of [`PlayerState`]. Every mutation goes through here, is
//! mirrored as a [`PlayerEvent`] and written to the configured store.

use crate::{
    error::{AdapterError, PlayerError, Result},
    events::PlayerEvent,
    proxy::InstanceProxy,
    snapshot::{self, PersistedSnapshot},
    timeline::VirtualTimeline,
    types::{PlayRequest, PlayerConfig, PlayerMode, PlayerState},
};
use preludio_storage::{KeyValueStore, MemoryStore};
use std::rc::Rc;
use tracing::{debug, error, info, warn};

/// What the store is known to hold for our key
#[derive(Debug, Clone, PartialEq)]
enum Persisted {
    /// Not checked yet this session
    Unknown,
    Absent,
    Written(PersistedSnapshot),
}

/// Session-wide player state machine
///
/// Hosts drive it with user intents (`play`, `pause`, `seek_to`, ...) while
/// the mounted adapter reports back through the `on_*` callbacks.
pub struct PlaybackOrchestrator {
    state: PlayerState,
    config: PlayerConfig,
    store: Box<dyn KeyValueStore>,

    // Handle onto the currently mounted adapter
    player_instance: Option<Rc<dyn InstanceProxy>>,

    // Event queue for UI synchronization
    pending_events: Vec<PlayerEvent>,

    // Bumped on every state change
    revision: u64,

    persisted: Persisted,
}

impl PlaybackOrchestrator {
    /// Create an orchestrator with default state, ignoring anything stored
    pub fn new(config: PlayerConfig, store: impl KeyValueStore + 'static) -> Self {
        Self {
            state: PlayerState::new(config.default_volume),
            config,
            store: Box::new(store),
            player_instance: None,
            pending_events: Vec::new(),
            revision: 0,
            persisted: Persisted::Unknown,
        }
    }

    /// Create an orchestrator that keeps nothing beyond the session
    pub fn in_memory(config: PlayerConfig) -> Self {
        Self::new(config, MemoryStore::new())
    }

    /// Create an orchestrator and rehydrate it from the store
    ///
    /// A restored session is never playing and never ready, and gets a fresh
    /// playback id. Unusable snapshots are deleted; a failed read starts
    /// empty and keeps whatever is stored.
    pub fn restore(config: PlayerConfig, store: impl KeyValueStore + 'static) -> Self {
        let mut orchestrator = Self::new(config, store);
        orchestrator.hydrate();
        orchestrator
    }

    fn hydrate(&mut self) {
        let key = self.config.storage_key.clone();
        match snapshot::load(self.store.as_ref(), &key, &self.config) {
            Ok(Some(stored)) => {
                stored.apply_to(&mut self.state);
                self.state.is_playing = false;
                self.state.is_ready = false;
                self.state.playback_id += 1;
                self.persisted = Persisted::Written(stored);
                self.revision += 1;

                info!(
                    src = %self.state.src,
                    mode = %self.state.mode,
                    current_time = self.state.current_time,
                    "Restored player state"
                );
                self.pending_events.push(PlayerEvent::Restored {
                    playback_id: self.state.playback_id,
                });
            }
            Ok(None) => {
                debug!(key = %key, "No stored player state");
                self.persisted = Persisted::Absent;
            }
            Err(PlayerError::Persistence(e)) => {
                // Store unreadable, not the document: keep it
                warn!(key = %key, error = %e, "Failed to read stored player state");
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding stored player state");
                match snapshot::clear(self.store.as_ref(), &key) {
                    Ok(()) => self.persisted = Persisted::Absent,
                    Err(e) => warn!(key = %key, error = %e, "Failed to delete stored player state"),
                }
            }
        }
    }

    // ===== State Access =====

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Monotonic counter bumped on every state change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Trimmed-window view of the current position
    pub fn timeline(&self) -> VirtualTimeline {
        self.state.timeline()
    }

    // ===== Playback Control =====

    /// Start or restart playback of a source
    ///
    /// Returns the new playback id. A rejected request leaves the state
    /// untouched and queues a [`PlayerEvent::Notice`] with the reason.
    pub fn play(&mut self, request: PlayRequest) -> Result<u64> {
        if let Err(err) = request.validate(&self.config) {
            warn!(source_id = %request.source_id, error = %err, "Rejected play request");
            self.pending_events.push(PlayerEvent::Notice {
                message: err.to_string(),
            });
            return Err(err.into());
        }

        let PlayRequest {
            source_id,
            provider,
            start_seconds,
            end_seconds,
            title,
            composer_name,
            performer,
            image,
            source_url,
            provider_label,
        } = request;

        let state = &mut self.state;
        let source_changed = source_id != state.src;
        let previous_mode = state.mode;

        state.playback_id += 1;
        state.is_playing = true;

        if source_changed {
            state.src = source_id;
            state.current_time = 0.0;
            state.duration = 0.0;
            state.is_ready = false;
            state.clear_metadata();
            state.start_seconds = start_seconds;
            state.end_seconds = end_seconds;
        } else if start_seconds.is_some() || end_seconds.is_some() {
            state.start_seconds = start_seconds;
            state.end_seconds = end_seconds;
        }

        if !source_changed && provider != state.platform {
            state.platform_url = None;
            state.platform_label = None;
        }
        state.platform = provider;
        if title.is_some() {
            state.title = title;
        }
        if composer_name.is_some() {
            state.composer = composer_name;
        }
        if performer.is_some() {
            state.performer = performer;
        }
        if image.is_some() {
            state.artwork = image;
        }
        if source_url.is_some() {
            state.platform_url = source_url;
        } else if state.platform_url.is_none() {
            state.platform_url = provider.watch_url(&state.src);
        }
        if provider_label.is_some() {
            state.platform_label = provider_label;
        } else if state.platform_label.is_none() {
            state.platform_label = provider.default_label().map(str::to_string);
        }

        if state.mode == PlayerMode::Hidden {
            state.mode = PlayerMode::Mini;
        }

        let playback_id = state.playback_id;
        info!(
            playback_id,
            src = %state.src,
            provider = %state.platform,
            source_changed,
            "Playback requested"
        );

        let src = state.src.clone();
        let mode = state.mode;
        self.pending_events.push(PlayerEvent::PlaybackRequested {
            playback_id,
            src,
            source_changed,
        });
        if mode != previous_mode {
            self.pending_events.push(PlayerEvent::ModeChanged { mode });
        }
        self.commit(None);

        Ok(playback_id)
    }

    /// Pause playback
    pub fn pause(&mut self) {
        if self.state.is_playing {
            self.state.is_playing = false;
            self.commit(Some(PlayerEvent::PlayStateChanged { is_playing: false }));
        }
    }

    /// Flip between playing and paused
    pub fn toggle_play(&mut self) {
        self.state.is_playing = !self.state.is_playing;
        let is_playing = self.state.is_playing;
        self.commit(Some(PlayerEvent::PlayStateChanged { is_playing }));
    }

    /// Seek to an absolute position in seconds
    ///
    /// Delegated to the mounted adapter. Without one, or for non-finite
    /// input, the call is dropped.
    pub fn seek_to(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            debug!(seconds, "Ignoring non-finite seek");
            return;
        }
        let seconds = seconds.max(0.0);

        let proxy = match self.instance() {
            Ok(proxy) => proxy,
            Err(e) => {
                debug!(seconds, error = %e, "Seek dropped");
                return;
            }
        };
        proxy.seek_to(seconds);

        if self.state.current_time != seconds {
            self.state.current_time = seconds;
            self.commit(Some(PlayerEvent::PositionChanged {
                current_time: seconds,
            }));
        }
    }

    /// Set volume (0-100, clamped)
    ///
    /// Dropped without a mounted adapter.
    pub fn set_volume(&mut self, level: u8) {
        let level = level.min(100);

        let proxy = match self.instance() {
            Ok(proxy) => proxy,
            Err(e) => {
                debug!(level, error = %e, "Volume change dropped");
                return;
            }
        };
        proxy.set_volume(level);

        if self.state.volume != level {
            self.state.volume = level;
            self.commit(Some(PlayerEvent::VolumeChanged { level }));
        }
    }

    /// Switch presentation mode
    pub fn set_mode(&mut self, mode: PlayerMode) {
        if self.state.mode != mode {
            debug!(from = %self.state.mode, to = %mode, "Mode changed");
            self.state.mode = mode;
            self.commit(Some(PlayerEvent::ModeChanged { mode }));
        }
    }

    /// Stop, clear the source and hide the player
    ///
    /// Volume and the playback id counter survive.
    pub fn dismiss(&mut self) {
        let state = &mut self.state;
        if !state.has_source() && state.mode == PlayerMode::Hidden && !state.is_playing {
            return;
        }

        info!(src = %state.src, "Player dismissed");
        state.src.clear();
        state.clear_metadata();
        state.start_seconds = None;
        state.end_seconds = None;
        state.is_playing = false;
        state.is_ready = false;
        state.current_time = 0.0;
        state.duration = 0.0;
        state.mode = PlayerMode::Hidden;
        self.commit(Some(PlayerEvent::SourceCleared));
    }

    // ===== Adapter Handle =====

    /// Register or clear the handle onto the mounted adapter
    pub fn set_player_instance(&mut self, instance: Option<Rc<dyn InstanceProxy>>) {
        debug!(registered = instance.is_some(), "Player instance updated");
        self.player_instance = instance;
    }

    pub fn has_player_instance(&self) -> bool {
        self.player_instance.is_some()
    }

    fn instance(&self) -> Result<Rc<dyn InstanceProxy>> {
        self.player_instance
            .clone()
            .ok_or(PlayerError::ProxyUnavailable)
    }

    // ===== Adapter Callbacks =====

    /// The mounted embed finished initializing
    pub fn on_ready(&mut self, duration: f64) {
        self.state.is_ready = true;
        if duration.is_finite() && duration > 0.0 {
            self.state.duration = duration;
        }
        let duration = self.state.duration;
        self.commit(Some(PlayerEvent::Ready { duration }));
    }

    /// Periodic position report
    pub fn on_progress(&mut self, current_time: f64) {
        if !current_time.is_finite() || self.state.current_time == current_time {
            return;
        }
        self.state.current_time = current_time.max(0.0);
        let current_time = self.state.current_time;
        self.commit(Some(PlayerEvent::PositionChanged { current_time }));
    }

    /// The embed changed its own playing flag
    pub fn on_state_change(&mut self, is_playing: bool) {
        if self.state.is_playing == is_playing {
            return;
        }
        self.state.is_playing = is_playing;
        self.commit(Some(PlayerEvent::PlayStateChanged { is_playing }));
    }

    /// The adapter failed; playback stops and the error stays in the logs
    pub fn on_error(&mut self, error: &AdapterError) {
        error!(
            src = %self.state.src,
            provider = %self.state.platform,
            error = %error,
            "Playback failed"
        );
        self.on_state_change(false);
    }

    /// The embed reported the source length
    pub fn on_duration(&mut self, duration: f64) {
        if !duration.is_finite() || duration < 0.0 || self.state.duration == duration {
            return;
        }
        self.state.duration = duration;
        self.commit(Some(PlayerEvent::DurationChanged { duration }));
    }

    // ===== Events =====

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Persistence =====

    fn commit(&mut self, event: Option<PlayerEvent>) {
        self.revision += 1;
        if let Some(event) = event {
            self.pending_events.push(event);
        }
        self.persist();
    }

    /// Write the snapshot, or remove it when nothing is worth keeping
    ///
    /// Storage failures are logged and never reach the caller.
    fn persist(&mut self) {
        let key = &self.config.storage_key;

        if snapshot::is_disposable(&self.state) {
            if self.persisted == Persisted::Absent {
                return;
            }
            match snapshot::clear(self.store.as_ref(), key) {
                Ok(()) => {
                    debug!(key = %key, "Removed stored player state");
                    self.persisted = Persisted::Absent;
                }
                Err(e) => warn!(key = %key, error = %e, "Failed to remove player state"),
            }
            return;
        }

        let current = PersistedSnapshot::capture(&self.state);
        if matches!(&self.persisted, Persisted::Written(previous) if *previous == current) {
            return;
        }
        match snapshot::save(self.store.as_ref(), key, &current) {
            Ok(()) => self.persisted = Persisted::Written(current),
            Err(e) => warn!(key = %key, error = %e, "Failed to persist player state"),
        }
    }
}

impl std::fmt::Debug for PlaybackOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackOrchestrator")
            .field("state", &self.state)
            .field("revision", &self.revision)
            .field("has_player_instance", &self.has_player_instance())
            .field("pending_events", &self.pending_events.len())
            .finish_non_exhaustive()
    }
}
