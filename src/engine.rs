//! TimelineEngine: the transport state machine.
//!
//! Owns a [`TimelineClock`] and an [`AnimationRegistry`] and is the only
//! writer of [`crate::registry::AnimationHandle`] fields after load. The
//! engine keeps every clip's enabled/paused/local-time state consistent under
//! play, pause, arbitrary scrubbing, and rewind, including re-entrant,
//! non-monotonic time jumps.

use tracing::debug;

use crate::clock::TimelineClock;
use crate::config::EngineConfig;
use crate::error::TimelineError;
use crate::metrics::PlaybackMetrics;
use crate::outputs::{ClipSample, Outputs, TransportEvent};
use crate::registry::{AnimationRegistry, LoopPolicy};
use crate::time::{validate_position, wrap};

/// What a boundary cue means when it fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum CueKind {
    WindowStart,
    WindowEnd,
}

/// Payload scheduled against the clock for window boundaries.
///
/// Carries the registry generation it was scheduled under; cues that outlive
/// their registry are dropped on fire instead of mutating stale windows.
#[derive(Copy, Clone, Debug)]
pub struct TransportCue {
    pub(crate) generation: u64,
    pub(crate) entry: usize,
    pub(crate) window: usize,
    pub(crate) kind: CueKind,
}

/// Core playback engine reconciling one authoritative clock with many
/// independently time-boxed clip windows.
#[derive(Debug)]
pub struct TimelineEngine {
    clock: TimelineClock<TransportCue>,
    registry: AnimationRegistry,
    config: EngineConfig,
    /// Bumped on every `load()`; doubles as the reentrancy guard for cues
    /// scheduled against a superseded registry.
    generation: u64,
    is_playing: bool,
    /// Cached clock position, refreshed on every transport operation.
    position: f64,
    outputs: Outputs,
    /// Transport events raised between ticks, delivered by the next update.
    pending_events: Vec<TransportEvent>,
    /// Entries reconciled by a cue this tick; their cursors are already
    /// exact, so the drive pass must not advance them again.
    reconciled_entries: Vec<usize>,
    metrics: PlaybackMetrics,
}

impl Default for TimelineEngine {
    fn default() -> Self {
        Self::new(TimelineClock::new())
    }
}

impl TimelineEngine {
    /// Create an engine around an injected clock.
    pub fn new(clock: TimelineClock<TransportCue>) -> Self {
        Self::with_config(clock, EngineConfig::default())
    }

    pub fn with_config(clock: TimelineClock<TransportCue>, config: EngineConfig) -> Self {
        Self {
            clock,
            registry: AnimationRegistry::new(),
            config,
            generation: 0,
            is_playing: false,
            position: 0.0,
            outputs: Outputs::default(),
            pending_events: Vec::new(),
            reconciled_entries: Vec::new(),
            metrics: PlaybackMetrics::new(),
        }
    }

    /// Replace the registry wholesale and establish a valid initial state:
    /// the first-authored window of each target active at local time zero,
    /// all others disabled.
    ///
    /// Cancels every cue scheduled against the previous registry so no ghost
    /// callback can mutate a window that no longer exists. The clock's
    /// running flag is left alone; callers wanting a cold stop call
    /// [`TimelineEngine::stop`] as well.
    pub fn load(&mut self, registry: AnimationRegistry) {
        self.generation = self.generation.wrapping_add(1);
        self.clock.cancel_all();
        self.pending_events.clear();
        self.registry = registry;
        self.is_playing = false;
        self.reconcile_all(0.0);
        self.clock.set_position(0.0);
        self.position = 0.0;
        debug!(
            targets = self.registry.len(),
            windows = self.registry.window_count(),
            generation = self.generation,
            "registry loaded"
        );
    }

    /// Resume playback from the current position.
    ///
    /// Every window whose interval covers the position is unpaused in place
    /// without resetting its cursor. The start comparison is inclusive: a
    /// window beginning exactly at the current time must be unpaused here,
    /// not left to a separately scheduled start cue.
    pub fn play(&mut self) {
        let t = self.clock.position();
        self.apply_play_rule(t);
        self.clock.cancel_all();
        self.schedule_boundary_cues(t);
        self.clock.start();
        self.is_playing = true;
        self.pending_events
            .push(TransportEvent::PlaybackStarted { position: t });
    }

    /// Freeze playback in place. `enabled` and `local_time` are untouched.
    pub fn pause(&mut self) {
        self.clock.pause();
        self.clock.cancel_all();
        self.position = self.clock.position();
        self.is_playing = false;
        for entry in self.registry.entries_mut() {
            for window in entry.windows.iter_mut() {
                window.handle.paused = true;
            }
        }
        self.pending_events.push(TransportEvent::PlaybackPaused {
            position: self.position,
        });
    }

    /// Halt playback and snap the position to zero.
    ///
    /// With `reconcile_on_stop` (the default) handles are reconciled against
    /// position zero as well, so nothing is left in its stop-instant state.
    pub fn stop(&mut self) {
        self.clock.stop();
        self.clock.cancel_all();
        self.is_playing = false;
        self.position = 0.0;
        if self.config.reconcile_on_stop {
            self.reconcile_all(0.0);
        }
        self.pending_events.push(TransportEvent::PlaybackStopped);
    }

    /// Full reconciliation back to the initial state at position zero.
    pub fn rewind(&mut self) {
        self.seek_committed(0.0);
    }

    /// Jump the timeline to `time` and reconcile every target against it.
    ///
    /// Rejects non-finite times; negative times clamp to zero. If the engine
    /// is playing, pending cues are stale after the jump: they are cancelled,
    /// the play rule is re-applied and boundaries are rescheduled from the
    /// new position.
    pub fn seek(&mut self, time: f64) -> Result<(), TimelineError> {
        let time = validate_position(time)?;
        self.seek_committed(time);
        Ok(())
    }

    fn seek_committed(&mut self, time: f64) {
        let from = self.position;
        self.reconcile_all(time);
        self.clock.set_position(time);
        self.position = time;
        if self.is_playing {
            self.clock.cancel_all();
            self.apply_play_rule(time);
            self.schedule_boundary_cues(time);
        }
        self.pending_events
            .push(TransportEvent::Seeked { from, to: time });
    }

    /// Current position in seconds (clock passthrough).
    #[inline]
    pub fn get_position(&self) -> f64 {
        self.clock.position()
    }

    /// Jump the clock without reconciling handles. Callers that want the
    /// priority scan re-run must use [`TimelineEngine::seek`].
    pub fn set_position(&mut self, time: f64) -> Result<(), TimelineError> {
        let time = validate_position(time)?;
        self.clock.set_position(time);
        self.position = time;
        Ok(())
    }

    /// Per-frame drive of the interpolation runtime.
    ///
    /// While playing, advances the clock, fires due boundary cues in order,
    /// then moves every enabled, unpaused cursor by `delta` under its loop
    /// policy and emits one [`ClipSample`] per enabled handle. Calls with
    /// `delta = 0`, or while every handle is paused, never alter a cursor or
    /// an enabled flag.
    pub fn update(&mut self, delta: f64) -> &Outputs {
        self.outputs.clear();
        self.outputs.events.append(&mut self.pending_events);
        self.reconciled_entries.clear();
        self.metrics.updates += 1;

        if self.is_playing && delta > 0.0 {
            let fired = self.clock.advance(delta);
            for cue in fired {
                self.handle_cue(cue);
            }
            self.position = self.clock.position();
        }

        let position = self.position;
        for (entry_idx, entry) in self.registry.entries_mut().iter_mut().enumerate() {
            let reconciled = self.reconciled_entries.contains(&entry_idx);
            for (window_idx, window) in entry.windows.iter_mut().enumerate() {
                if window.handle.enabled && !window.handle.paused && delta > 0.0 && !reconciled {
                    let next = window.handle.local_time + delta;
                    let advanced = match window.loop_policy() {
                        LoopPolicy::OneShot => next.min(window.clip_duration()),
                        LoopPolicy::Repeat => wrap(next, window.clip_duration()),
                    };
                    let weight = window.weight_at(position);
                    window.handle.local_time = advanced;
                    window.handle.weight = weight;
                }
                if window.handle.enabled {
                    self.outputs.push_sample(ClipSample {
                        target_key: entry.target_key.clone(),
                        window: window_idx,
                        local_time: window.handle.local_time,
                        weight: window.handle.weight,
                    });
                    self.metrics.samples_emitted += 1;
                }
            }
        }

        &self.outputs
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    #[inline]
    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    #[inline]
    pub fn metrics(&self) -> &PlaybackMetrics {
        &self.metrics
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reconcile every target key against `time`, independently.
    fn reconcile_all(&mut self, time: f64) {
        for idx in 0..self.registry.len() {
            self.reconcile_entry(idx, time);
        }
    }

    /// The core scan, run once per target key.
    ///
    /// Reset pass, then the first-authored window as unconditional default,
    /// then a reverse-authoring-order priority scan with early exit: the most
    /// recently authored window covering (or having elapsed before) `time`
    /// wins over any earlier-authored one. This is what lets a later window
    /// supersede an earlier window that is merely holding a completed frame
    /// in the gap between two non-contiguous clips on the same target.
    fn reconcile_entry(&mut self, entry_idx: usize, time: f64) {
        let Some(entry) = self.registry.entries_mut().get_mut(entry_idx) else {
            return;
        };

        for window in entry.windows.iter_mut() {
            window.handle.reset();
        }

        let mut matched = false;
        for window in entry.windows.iter_mut().rev() {
            if time < window.start() {
                continue;
            }
            // Active or elapsed; either way the last-authored match wins and
            // every other window for this key stays disabled.
            window.handle.enabled = true;
            window.handle.local_time = window.local_time_at(time);
            window.handle.weight = window.weight_at(time);
            matched = true;
            break;
        }

        // Before the first scheduled window begins, an object is still never
        // left fully disabled: default to the first-authored window at local
        // time zero.
        if !matched {
            if let Some(first) = entry.windows.first_mut() {
                first.handle.enabled = true;
                first.handle.local_time = 0.0;
            }
        }

        self.metrics.seeks += 1;
    }

    /// Unpause every window whose interval covers `t`. Repeat windows stay
    /// eligible past their stop instant since their cursor keeps wrapping.
    fn apply_play_rule(&mut self, t: f64) {
        for idx in 0..self.registry.len() {
            self.apply_play_rule_entry(idx, t);
        }
    }

    fn apply_play_rule_entry(&mut self, entry_idx: usize, t: f64) {
        let Some(entry) = self.registry.entries_mut().get_mut(entry_idx) else {
            return;
        };
        for window in entry.windows.iter_mut() {
            if window.start() <= t && (t < window.end() || window.loop_policy() == LoopPolicy::Repeat)
            {
                window.handle.paused = false;
            }
        }
    }

    /// Schedule cues for every boundary still ahead of `t`: window starts,
    /// plus stop instants of finite one-shot windows (a repeat window keeps
    /// wrapping past its end and needs no cue of its own).
    fn schedule_boundary_cues(&mut self, t: f64) {
        let generation = self.generation;
        for (entry_idx, entry) in self.registry.entries().iter().enumerate() {
            for (window_idx, window) in entry.windows.iter().enumerate() {
                if window.start() > t {
                    self.clock.schedule_once(
                        window.start(),
                        TransportCue {
                            generation,
                            entry: entry_idx,
                            window: window_idx,
                            kind: CueKind::WindowStart,
                        },
                    );
                }
                if window.loop_policy() == LoopPolicy::OneShot
                    && window.end().is_finite()
                    && window.end() > t
                {
                    self.clock.schedule_once(
                        window.end(),
                        TransportCue {
                            generation,
                            entry: entry_idx,
                            window: window_idx,
                            kind: CueKind::WindowEnd,
                        },
                    );
                }
            }
        }
    }

    /// A boundary cue fired mid-tick: re-run the single-key scan at the
    /// current position and re-apply the play rule for that key.
    fn handle_cue(&mut self, cue: TransportCue) {
        if cue.generation != self.generation {
            debug!(
                cue_generation = cue.generation,
                generation = self.generation,
                "dropping cue from superseded registry"
            );
            return;
        }
        if cue.entry >= self.registry.len() {
            return;
        }
        let position = self.clock.position();
        self.reconcile_entry(cue.entry, position);
        self.apply_play_rule_entry(cue.entry, position);
        if !self.reconciled_entries.contains(&cue.entry) {
            self.reconciled_entries.push(cue.entry);
        }
        self.metrics.cues_fired += 1;

        let target_key = self.registry.entries()[cue.entry].target_key.clone();
        let event = match cue.kind {
            CueKind::WindowStart => TransportEvent::WindowEntered {
                target_key,
                window: cue.window,
                position,
            },
            CueKind::WindowEnd => TransportEvent::WindowCompleted {
                target_key,
                window: cue.window,
                position,
            },
        };
        self.outputs.push_event(event);
    }
}
