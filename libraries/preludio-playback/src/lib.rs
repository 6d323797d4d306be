//! Preludio - Session Player
//!
//! Platform-agnostic orchestration of the one media player shared by a
//! browsing session.
//!
//! This crate provides:
//! - A single-writer player state machine ([`PlaybackOrchestrator`])
//! - Validated play requests with trimmed windows (`startSeconds`/`endSeconds`)
//! - Snapshot persistence and restore through any [`KeyValueStore`]
//! - A controller binding the state to a lazily mounted embed adapter
//! - The virtual timeline shared by every surface
//! - Mini bar and immersive view models
//! - Resolution of play requests from `%%audio_*` content directives
//!
//! # Architecture
//!
//! `preludio-playback` never talks to a concrete embed:
//! - The controller mounts an [`AudioAdapter`] per source and registers an
//!   [`InstanceProxy`] so the orchestrator can seek without knowing the embed
//! - Embeds are provided via the [`EmbedPlayer`] / [`EmbedFactory`] traits
//! - Everything runs on one event loop; hosts advance time with
//!   [`PlayerController::tick`]
//!
//! # Example: Playing a trimmed window
//!
//! ```rust
//! use preludio_playback::{
//!     PlayRequest, PlaybackOrchestrator, PlayerConfig, PlayerController, PlayerMode, Provider,
//!     SimulatedEmbedFactory,
//! };
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! let config = PlayerConfig::default();
//! let mut player = PlaybackOrchestrator::in_memory(config.clone());
//! let factory = SimulatedEmbedFactory::new().with_media("dQw4w9WgXcQ", 212.0);
//! let mut controller = PlayerController::new(Rc::new(factory), &config);
//!
//! player
//!     .play(
//!         PlayRequest::new("dQw4w9WgXcQ", Provider::YouTube)
//!             .with_title("Ballade No. 1")
//!             .with_bounds(Some(30.0), Some(90.0)),
//!     )
//!     .unwrap();
//! controller.render(&mut player);
//! controller.tick(&mut player, Duration::from_millis(500));
//!
//! assert_eq!(player.state().mode, PlayerMode::Mini);
//! assert!(player.state().is_ready);
//! assert_eq!(player.timeline().display_duration, 60.0);
//! ```
//!
//! # Example: Restoring a session
//!
//! ```rust
//! use preludio_playback::{PlayRequest, PlaybackOrchestrator, PlayerConfig, Provider};
//! use preludio_storage::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let mut first = PlaybackOrchestrator::restore(PlayerConfig::default(), store.clone());
//! first.play(PlayRequest::new("abc123", Provider::YouTube)).unwrap();
//!
//! let second = PlaybackOrchestrator::restore(PlayerConfig::default(), store);
//! assert_eq!(second.state().src, "abc123");
//! assert!(!second.state().is_playing);
//! // Not persisted; bumped so the restored source is re-attached
//! assert_eq!(second.state().playback_id, 1);
//! ```

pub mod adapter;
pub mod binder;
mod controller;
mod error;
pub mod events;
mod orchestrator;
pub mod presentation;
mod proxy;
pub mod snapshot;
pub mod timeline;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use adapter::{
    AdapterEvent, AdapterProps, AdapterView, AudioAdapter, EmbedFactory, EmbedPlayer,
    SimulatedEmbedFactory,
};
pub use controller::PlayerController;
pub use error::{describe_embed_code, AdapterError, PlayerError, Result, ValidationError};
pub use events::PlayerEvent;
pub use orchestrator::PlaybackOrchestrator;
pub use proxy::InstanceProxy;
pub use snapshot::PersistedSnapshot;
pub use timeline::{format_time, VirtualTimeline};
pub use types::{PlayRequest, PlayerConfig, PlayerMode, PlayerState, Provider};

pub use preludio_storage::KeyValueStore;
