//! The single source of truth for "now" on the master timeline.
//!
//! `TimelineClock` is a deterministic in-memory transport: a position in
//! seconds, a running flag, and a one-shot cue scheduler keyed by absolute
//! position. It is generic over the cue payload so it carries no knowledge of
//! clips; the engine schedules [`crate::engine::TransportCue`] values, tests
//! schedule whatever is convenient. Advancement is driven by the host loop
//! through [`TimelineClock::advance`], which keeps playback reproducible.

/// Handle to a scheduled cue, usable for cancellation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CueId(u64);

#[derive(Debug)]
struct ScheduledCue<C> {
    id: CueId,
    at: f64,
    cue: C,
}

/// Deterministic playback clock with a one-shot cue scheduler.
#[derive(Debug)]
pub struct TimelineClock<C> {
    position: f64,
    running: bool,
    cues: Vec<ScheduledCue<C>>,
    next_id: u64,
}

impl<C> Default for TimelineClock<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TimelineClock<C> {
    /// Create a stopped clock at position zero.
    pub fn new() -> Self {
        Self {
            position: 0.0,
            running: false,
            cues: Vec::new(),
            next_id: 0,
        }
    }

    /// Current position in seconds.
    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Jump the position. No side effects beyond the position itself; any
    /// reconciliation of dependent state is the caller's responsibility.
    #[inline]
    pub fn set_position(&mut self, seconds: f64) {
        self.position = seconds;
    }

    /// Whether [`TimelineClock::advance`] currently moves the position.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Resume advancement from the current position.
    #[inline]
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Freeze the position in place.
    #[inline]
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Freeze and snap the position back to zero.
    #[inline]
    pub fn stop(&mut self) {
        self.running = false;
        self.position = 0.0;
    }

    /// Register a cue to fire once the position reaches `at` while running.
    pub fn schedule_once(&mut self, at: f64, cue: C) -> CueId {
        let id = CueId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.cues.push(ScheduledCue { id, at, cue });
        id
    }

    /// Cancel one pending cue. Returns whether it was still pending.
    pub fn cancel(&mut self, id: CueId) -> bool {
        let before = self.cues.len();
        self.cues.retain(|c| c.id != id);
        self.cues.len() != before
    }

    /// Drop every pending cue.
    #[inline]
    pub fn cancel_all(&mut self) {
        self.cues.clear();
    }

    /// Number of cues still pending.
    #[inline]
    pub fn pending_cues(&self) -> usize {
        self.cues.len()
    }

    /// Advance the position by `dt` seconds and collect the cues that became
    /// due, ordered by scheduled time (registration order breaks ties).
    ///
    /// Does nothing unless the clock is running and `dt` is positive.
    pub fn advance(&mut self, dt: f64) -> Vec<C> {
        if !self.running || dt <= 0.0 {
            return Vec::new();
        }
        self.position += dt;

        let position = self.position;
        let mut due: Vec<ScheduledCue<C>> = Vec::new();
        let mut i = 0;
        while i < self.cues.len() {
            if self.cues[i].at <= position {
                due.push(self.cues.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| {
            a.at.partial_cmp(&b.at)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.0.cmp(&b.id.0))
        });
        due.into_iter().map(|c| c.cue).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_flags() {
        let mut clock: TimelineClock<u32> = TimelineClock::new();
        assert!(!clock.is_running());
        assert_eq!(clock.position(), 0.0);

        clock.start();
        assert!(clock.is_running());

        clock.set_position(2.5);
        clock.pause();
        assert!(!clock.is_running());
        assert_eq!(clock.position(), 2.5);

        clock.stop();
        assert_eq!(clock.position(), 0.0);
    }

    #[test]
    fn test_advance_requires_running() {
        let mut clock: TimelineClock<u32> = TimelineClock::new();
        clock.schedule_once(0.5, 7);
        assert!(clock.advance(1.0).is_empty());
        assert_eq!(clock.position(), 0.0);

        clock.start();
        assert_eq!(clock.advance(1.0), vec![7]);
        assert_eq!(clock.position(), 1.0);
    }
}
