//! Timeline Synchronization Engine
//!
//! Reconciles a single authoritative playback clock with many independently
//! time-boxed animation clips attached to scene targets, keeping every clip's
//! enabled/paused/local-time state consistent under play, pause, arbitrary
//! scrubbing, and rewind. Scene assembly and rendering live in the host; the
//! engine consumes a compiled [`registry::AnimationRegistry`] and emits
//! per-frame [`outputs::ClipSample`]s plus transport events.

pub mod clock;
pub mod compile;
pub mod config;
pub mod engine;
pub mod error;
pub mod loaders;
pub mod metrics;
pub mod outputs;
pub mod registry;
pub mod time;

// Re-export common types for convenience
pub use clock::{CueId, TimelineClock};
pub use compile::{compile_actions, Action, ActionPayload, ClipLibrary, TargetHandle, TargetResolver};
pub use config::EngineConfig;
pub use engine::{TimelineEngine, TransportCue};
pub use error::TimelineError;
pub use metrics::PlaybackMetrics;
pub use outputs::{ClipSample, Outputs, TransportEvent};
pub use registry::{AnimationHandle, AnimationRegistry, ClipWindow, LoopPolicy, WindowSpec};
pub use time::OPEN_END;

/// Timeline engine result type
pub type Result<T> = core::result::Result<T, TimelineError>;
