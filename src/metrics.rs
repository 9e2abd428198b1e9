//! Playback metrics for the timeline engine

/// Cheap counters updated while the engine runs, readable by hosts.
#[derive(Debug, Clone, Default)]
pub struct PlaybackMetrics {
    /// Number of `update()` ticks processed
    pub updates: u64,
    /// Number of full or per-key reconciliation passes executed
    pub seeks: u64,
    /// Number of scheduled cues that fired (stale ones excluded)
    pub cues_fired: u64,
    /// Number of clip samples emitted across all ticks
    pub samples_emitted: u64,
}

impl PlaybackMetrics {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset metrics
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
