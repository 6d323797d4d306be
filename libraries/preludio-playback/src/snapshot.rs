//! Persisted player snapshot
//!
//! The snapshot is a strict subset of [`PlayerState`]: transient flags
//! (`isPlaying`, `isReady`) and `playbackId` are never written. Documents are
//! versioned and checked field by field on load; anything that does not match
//! the current shape is discarded by the caller.

use crate::error::{PlayerError, Result};
use crate::types::{validate_bounds, PlayerConfig, PlayerMode, PlayerState, Provider};
use preludio_storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema version written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersistedSnapshot {
    pub version: u32,
    pub current_time: f64,
    pub duration: f64,
    pub src: String,
    pub mode: PlayerMode,
    pub title: Option<String>,
    pub composer: Option<String>,
    pub performer: Option<String>,
    pub artwork_src: Option<String>,
    pub platform_url: Option<String>,
    pub platform_label: Option<String>,
    pub platform: Provider,
    pub volume: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_seconds: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_seconds: Option<f64>,
}

impl PersistedSnapshot {
    pub fn capture(state: &PlayerState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            current_time: state.current_time,
            duration: state.duration,
            src: state.src.clone(),
            mode: state.mode,
            title: state.title.clone(),
            composer: state.composer.clone(),
            performer: state.performer.clone(),
            artwork_src: state.artwork.clone(),
            platform_url: state.platform_url.clone(),
            platform_label: state.platform_label.clone(),
            platform: state.platform,
            volume: state.volume,
            start_seconds: state.start_seconds,
            end_seconds: state.end_seconds,
        }
    }

    /// Copy the persisted fields onto `state`, leaving transient fields alone
    pub fn apply_to(&self, state: &mut PlayerState) {
        state.current_time = self.current_time;
        state.duration = self.duration;
        state.src.clone_from(&self.src);
        state.mode = self.mode;
        state.title.clone_from(&self.title);
        state.composer.clone_from(&self.composer);
        state.performer.clone_from(&self.performer);
        state.artwork.clone_from(&self.artwork_src);
        state.platform_url.clone_from(&self.platform_url);
        state.platform_label.clone_from(&self.platform_label);
        state.platform = self.platform;
        state.volume = self.volume;
        state.start_seconds = self.start_seconds;
        state.end_seconds = self.end_seconds;
    }

    /// Range checks serde cannot express
    pub fn validate(&self, config: &PlayerConfig) -> Result<()> {
        if self.volume > 100 {
            return Err(PlayerError::InvalidSnapshot(format!(
                "volume {} is above 100",
                self.volume
            )));
        }
        for (field, value) in [
            ("currentTime", self.current_time),
            ("duration", self.duration),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlayerError::InvalidSnapshot(format!(
                    "{field} must be a non-negative number (got {value})"
                )));
            }
        }
        if self.src.len() > config.max_source_id_len {
            return Err(PlayerError::InvalidSnapshot(
                "source ID is too long".to_string(),
            ));
        }
        validate_bounds(self.start_seconds, self.end_seconds, config.max_seconds)
            .map_err(|e| PlayerError::InvalidSnapshot(e.to_string()))
    }
}

/// Whether `state` has nothing worth persisting
pub fn is_disposable(state: &PlayerState) -> bool {
    state.mode == PlayerMode::Hidden && state.src.is_empty()
}

/// Read and check the snapshot stored under `key`
///
/// `Ok(None)` means nothing is stored. [`PlayerError::Persistence`] means the
/// store could not be read; any other error means the stored document is
/// unusable and should be removed.
pub fn load(
    store: &dyn KeyValueStore,
    key: &str,
    config: &PlayerConfig,
) -> Result<Option<PersistedSnapshot>> {
    let Some(raw) = store.get_string(key)? else {
        return Ok(None);
    };

    // Version first, so a future layout reports as a version problem
    let value: Value = serde_json::from_str(&raw)?;
    let found = value.get("version").and_then(Value::as_u64);
    if found != Some(u64::from(SNAPSHOT_VERSION)) {
        return Err(PlayerError::SnapshotVersion {
            found,
            expected: SNAPSHOT_VERSION,
        });
    }

    let snapshot: PersistedSnapshot = serde_json::from_value(value)?;
    snapshot.validate(config)?;
    Ok(Some(snapshot))
}

pub fn save(store: &dyn KeyValueStore, key: &str, snapshot: &PersistedSnapshot) -> Result<()> {
    let json = serde_json::to_string(snapshot)?;
    store.set_string(key, &json)?;
    Ok(())
}

pub fn clear(store: &dyn KeyValueStore, key: &str) -> Result<()> {
    store.delete(key)?;
    Ok(())
}
