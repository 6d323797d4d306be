//! Error types for player orchestration

use crate::types::Provider;
use preludio_storage::StorageError;
use thiserror::Error;

/// A play request that failed validation
///
/// The message is meant to be shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("A source ID is required")]
    EmptySourceId,

    #[error("Source ID is longer than {max} bytes")]
    SourceIdTooLong { max: usize },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be between 0 and {max} seconds (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },

    #[error("endSeconds ({end}) must be greater than startSeconds ({start})")]
    InvalidRange { start: f64, end: f64 },
}

/// Failures raised by a media adapter or its embed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    /// No embed could be constructed for the provider
    #[error("Embedded player for {0} is unavailable")]
    EmbedUnavailable(Provider),

    /// The embed rejected a load or cue call
    #[error("Failed to load {video_id}: {message}")]
    LoadFailed { video_id: String, message: String },

    /// Error code reported asynchronously by the embed
    #[error("Embedded player error {code}: {}", embed_reason(.code))]
    Embed { code: i32 },
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn embed_reason(code: &i32) -> &'static str {
    describe_embed_code(*code)
}

/// Text for the error codes the YouTube iframe API reports
pub fn describe_embed_code(code: i32) -> &'static str {
    match code {
        2 => "invalid parameter",
        5 => "HTML5 player error",
        100 => "video not found or private",
        101 | 150 => "embedding disabled by the owner",
        _ => "unknown error",
    }
}

/// Player errors
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Play request rejected before any state changed
    #[error("Invalid play request: {0}")]
    Validation(#[from] ValidationError),

    /// Adapter or embed failure
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// Storage backend failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),

    /// Stored snapshot could not be (de)serialized
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Stored snapshot was written by an incompatible version
    #[error("Snapshot version {found:?} is not supported (expected {expected})")]
    SnapshotVersion { found: Option<u64>, expected: u32 },

    /// Stored snapshot parsed but holds values outside the allowed ranges
    #[error("Snapshot rejected: {0}")]
    InvalidSnapshot(String),

    /// Imperative call made while no mounted adapter registered a handle
    #[error("No player instance is registered")]
    ProxyUnavailable,
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_user_facing() {
        let err = ValidationError::InvalidRange {
            start: 30.0,
            end: 10.0,
        };
        assert_eq!(
            err.to_string(),
            "endSeconds (10) must be greater than startSeconds (30)"
        );
    }

    #[test]
    fn embed_codes_are_described() {
        let err = AdapterError::Embed { code: 150 };
        assert_eq!(
            err.to_string(),
            "Embedded player error 150: embedding disabled by the owner"
        );
        assert_eq!(describe_embed_code(42), "unknown error");
    }

    #[test]
    fn player_error_wraps_sources() {
        let err: PlayerError = ValidationError::EmptySourceId.into();
        assert!(matches!(err, PlayerError::Validation(_)));
        assert!(err.to_string().starts_with("Invalid play request"));
    }
}
