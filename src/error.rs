//! Error types for the timeline engine

use serde::{Deserialize, Serialize};

/// Error type covering load-time validation and transport operations.
///
/// Everything in this taxonomy is locally recoverable: compilation skips the
/// offending action and continues, and the running engine never surfaces an
/// error for data that made it into the registry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TimelineError {
    /// An action references a scene object that does not exist
    #[error("Target not found in scene: {target}")]
    MissingTarget { target: String },

    /// An action kind the engine has no support for
    #[error("Unsupported action kind: {kind}")]
    UnsupportedActionKind { kind: String },

    /// A named clip absent from an asset's embedded clip library
    #[error("Clip not found: {clip} in asset {asset}")]
    ClipNotFound { asset: String, clip: String },

    /// Structurally invalid window (end before start, negative duration, ...)
    #[error("Invalid window config: {reason}")]
    InvalidWindowConfig { reason: String },

    /// Non-finite or otherwise unusable time value
    #[error("Invalid time value: {time}")]
    InvalidTime { time: f64 },

    /// Malformed action document
    #[error("Parse error: {reason}")]
    Parse { reason: String },
}

impl TimelineError {
    /// Check if this error is recovered by skipping the offending input.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Parse { .. })
    }

    /// Get error category for logging/metrics
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingTarget { .. } => "scene",
            Self::UnsupportedActionKind { .. } => "action",
            Self::ClipNotFound { .. } => "asset",
            Self::InvalidWindowConfig { .. } | Self::InvalidTime { .. } => "validation",
            Self::Parse { .. } => "parse",
        }
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
