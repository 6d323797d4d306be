//! WASM bindings for preludio-playback
//!
//! Exposes the orchestrator to the browser. The page keeps driving the real
//! iframe embed and reports back through the `notify*` methods.

#[cfg(feature = "wasm")]
pub mod player;

#[cfg(feature = "wasm")]
pub mod proxy;

#[cfg(feature = "wasm")]
pub use player::WasmAudioPlayer;

#[cfg(feature = "wasm")]
pub use proxy::JsInstanceProxy;
