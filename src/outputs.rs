//! Output contracts from the engine.
//!
//! Each tick carries the per-clip drive records for the interpolation
//! runtime plus a list of discrete transport signals. Hosts apply samples to
//! their rendering runtime and surface events to UI/telemetry.

use serde::{Deserialize, Serialize};

/// One enabled clip's drive record for this tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipSample {
    /// Resolved target key the clip poses.
    pub target_key: String,
    /// Index of the window within the target's authored list.
    pub window: usize,
    /// Time cursor to sample the clip at, in clip-local seconds.
    pub local_time: f64,
    /// Blend weight in `[0, 1]`.
    pub weight: f32,
}

/// Discrete transport signals emitted while stepping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TransportEvent {
    PlaybackStarted {
        position: f64,
    },
    PlaybackPaused {
        position: f64,
    },
    PlaybackStopped,
    Seeked {
        from: f64,
        to: f64,
    },
    /// The clock crossed a window's start during playback.
    WindowEntered {
        target_key: String,
        window: usize,
        position: f64,
    },
    /// The clock crossed a one-shot window's stop instant during playback.
    WindowCompleted {
        target_key: String,
        window: usize,
        position: f64,
    },
}

/// Outputs returned by `TimelineEngine::update()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub samples: Vec<ClipSample>,
    #[serde(default)]
    pub events: Vec<TransportEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.samples.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_sample(&mut self, sample: ClipSample) {
        self.samples.push(sample);
    }

    #[inline]
    pub fn push_event(&mut self, event: TransportEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.events.is_empty()
    }
}
