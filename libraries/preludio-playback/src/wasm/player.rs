//! WASM-compatible player wrapper

use super::proxy::JsInstanceProxy;
use crate::{
    adapter::EmbedState, events::PlayerEvent, AdapterError, PlayRequest, PlaybackOrchestrator,
    PlayerConfig, PlayerMode,
};
use js_sys::Function;
use preludio_storage::{KeyValueStore, LocalStorageStore, MemoryStore};
use std::rc::Rc;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;

/// Session player for the browser
///
/// Wraps [`PlaybackOrchestrator`] with a JavaScript-friendly API. State is
/// persisted to `localStorage` when available.
#[wasm_bindgen]
pub struct WasmAudioPlayer {
    inner: PlaybackOrchestrator,

    // Event callbacks
    on_state_change: Option<Function>,
    on_notice: Option<Function>,
}

#[wasm_bindgen]
impl WasmAudioPlayer {
    /// Create a player, restoring any state left by a previous page load
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook::set_once();

        let store: Box<dyn KeyValueStore> = match LocalStorageStore::new() {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!(error = %e, "localStorage unavailable, state will not survive reloads");
                Box::new(MemoryStore::new())
            }
        };

        Self {
            inner: PlaybackOrchestrator::restore(PlayerConfig::default(), store),
            on_state_change: None,
            on_notice: None,
        }
    }

    // ===== Playback Control =====

    /// Play a request object (`{ sourceId, provider, startSeconds, ... }`)
    ///
    /// Resolves to the new playback id.
    pub fn play(&mut self, request: JsValue) -> Result<f64, JsValue> {
        let request: PlayRequest = serde_wasm_bindgen::from_value(request)
            .map_err(|e| JsValue::from_str(&format!("Invalid play request: {e}")))?;

        let result = self.inner.play(request);
        self.flush_events();
        result
            .map(|id| id as f64)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn pause(&mut self) {
        self.inner.pause();
        self.flush_events();
    }

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&mut self) {
        self.inner.toggle_play();
        self.flush_events();
    }

    /// Seek to an absolute position in seconds
    #[wasm_bindgen(js_name = seekTo)]
    pub fn seek_to(&mut self, seconds: f64) {
        self.inner.seek_to(seconds);
        self.flush_events();
    }

    /// Set volume (0-100)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, level: u8) {
        self.inner.set_volume(level);
        self.flush_events();
    }

    /// Set mode ("hidden", "mini", "immersive")
    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode: PlayerMode = mode.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.inner.set_mode(mode);
        self.flush_events();
        Ok(())
    }

    pub fn dismiss(&mut self) {
        self.inner.dismiss();
        self.flush_events();
    }

    // ===== State =====

    /// Current state as a plain object
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.state()).unwrap_or(JsValue::NULL)
    }

    pub fn revision(&self) -> f64 {
        self.inner.revision() as f64
    }

    // ===== Embed Bridge =====

    /// Register the mounted embed (`{ seekTo, setVolume }`), or clear it with null
    #[wasm_bindgen(js_name = setPlayerInstance)]
    pub fn set_player_instance(&mut self, instance: JsValue) {
        if instance.is_null() || instance.is_undefined() {
            self.inner.set_player_instance(None);
        } else {
            self.inner
                .set_player_instance(Some(Rc::new(JsInstanceProxy::new(instance))));
        }
    }

    #[wasm_bindgen(js_name = notifyReady)]
    pub fn notify_ready(&mut self, duration: f64) {
        self.inner.on_ready(duration);
        self.flush_events();
    }

    #[wasm_bindgen(js_name = notifyProgress)]
    pub fn notify_progress(&mut self, current_time: f64) {
        self.inner.on_progress(current_time);
        self.flush_events();
    }

    #[wasm_bindgen(js_name = notifyStateChange)]
    pub fn notify_state_change(&mut self, is_playing: bool) {
        self.inner.on_state_change(is_playing);
        self.flush_events();
    }

    #[wasm_bindgen(js_name = notifyDuration)]
    pub fn notify_duration(&mut self, duration: f64) {
        self.inner.on_duration(duration);
        self.flush_events();
    }

    #[wasm_bindgen(js_name = notifyEnded)]
    pub fn notify_ended(&mut self) {
        self.inner.on_state_change(false);
        self.flush_events();
    }

    /// Raw iframe API state code; transient states are ignored
    #[wasm_bindgen(js_name = notifyPlayerState)]
    pub fn notify_player_state(&mut self, code: i32) {
        match EmbedState::from_code(code).and_then(EmbedState::is_playing) {
            Some(is_playing) => self.notify_state_change(is_playing),
            None => debug!(code, "Ignoring embed state"),
        }
    }

    /// Embed error code; playback is stopped, the error is only logged
    #[wasm_bindgen(js_name = notifyError)]
    pub fn notify_error(&mut self, code: i32) {
        self.inner.on_error(&AdapterError::Embed { code });
        self.flush_events();
    }

    // ===== Event Listeners =====

    /// Register state change callback; receives the state object
    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&mut self, callback: Function) {
        self.on_state_change = Some(callback);
    }

    /// Register notice callback; receives a user-facing message
    #[wasm_bindgen(js_name = onNotice)]
    pub fn on_notice(&mut self, callback: Function) {
        self.on_notice = Some(callback);
    }

    // ===== Internal Event Emitters =====

    fn flush_events(&mut self) {
        let mut changed = false;
        for event in self.inner.drain_events() {
            match event {
                PlayerEvent::Notice { message } => self.emit_notice(&message),
                _ => changed = true,
            }
        }
        if changed {
            self.emit_state_change();
        }
    }

    fn emit_state_change(&self) {
        if let Some(ref cb) = self.on_state_change {
            cb.call1(&JsValue::NULL, &self.get_state()).ok();
        }
    }

    fn emit_notice(&self, message: &str) {
        if let Some(ref cb) = self.on_notice {
            cb.call1(&JsValue::NULL, &JsValue::from_str(message)).ok();
        }
    }
}

impl Default for WasmAudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}
