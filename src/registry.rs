//! Clip scheduling model: handles, windows, and the per-target registry.

use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::time::{wrap, OPEN_END};

/// Defines what "time t" means once a window's scheduled interval has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LoopPolicy {
    /// Play once, then hold the final frame indefinitely.
    #[default]
    OneShot,
    /// Wrap local time modulo the intrinsic clip duration indefinitely.
    Repeat,
}

/// Mutable playback state of one clip instance as seen by the interpolation
/// runtime. Created once per [`ClipWindow`] at load time; only its fields
/// mutate afterwards, and only the engine writes them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationHandle {
    /// Whether the clip contributes a pose this frame.
    pub enabled: bool,
    /// Whether the clip's time cursor is frozen.
    pub paused: bool,
    /// Time cursor fed to the interpolation runtime, relative to the
    /// window's own start, not the master timeline.
    pub local_time: f64,
    /// Blend weight in `[0, 1]`, driven by the window's fade ramps.
    pub weight: f32,
}

impl Default for AnimationHandle {
    fn default() -> Self {
        Self {
            enabled: false,
            paused: true,
            local_time: 0.0,
            weight: 1.0,
        }
    }
}

impl AnimationHandle {
    /// Return the handle to its load-time state. Also flushes the time
    /// cursor so no residual pose leaks through while disabled.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Serde-facing construction record for a [`ClipWindow`].
///
/// `end: None` means the window runs to the end of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub start: f64,
    #[serde(default)]
    pub end: Option<f64>,
    /// Intrinsic clip length used for modulo wrap; distinct from
    /// `end - start` when a looping clip is truncated by its window.
    pub clip_duration: f64,
    #[serde(default)]
    pub loop_policy: LoopPolicy,
    #[serde(default)]
    pub fade_in: f64,
    #[serde(default)]
    pub fade_out: f64,
}

/// Immutable (post-load) scheduling record binding one [`AnimationHandle`] to
/// a time interval `[start, end)` on the master timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipWindow {
    start: f64,
    end: f64,
    clip_duration: f64,
    loop_policy: LoopPolicy,
    fade_in: f64,
    fade_out: f64,
    /// Exclusively owned playback state; the only part of the window that
    /// mutates after construction.
    pub handle: AnimationHandle,
}

impl ClipWindow {
    /// Validate a spec into a window. All runtime math assumes the
    /// invariants enforced here, in particular that `clip_duration` is never
    /// a negative modulo divisor.
    pub fn from_spec(spec: WindowSpec) -> Result<Self, TimelineError> {
        if !spec.start.is_finite() || spec.start < 0.0 {
            return Err(TimelineError::InvalidWindowConfig {
                reason: format!("start must be finite and non-negative, got {}", spec.start),
            });
        }
        let end = spec.end.unwrap_or(OPEN_END);
        if end.is_nan() || end < spec.start {
            return Err(TimelineError::InvalidWindowConfig {
                reason: format!("end {} precedes start {}", end, spec.start),
            });
        }
        if !spec.clip_duration.is_finite() || spec.clip_duration < 0.0 {
            return Err(TimelineError::InvalidWindowConfig {
                reason: format!(
                    "clip_duration must be finite and non-negative, got {}",
                    spec.clip_duration
                ),
            });
        }
        for (name, fade) in [("fade_in", spec.fade_in), ("fade_out", spec.fade_out)] {
            if !fade.is_finite() || fade < 0.0 {
                return Err(TimelineError::InvalidWindowConfig {
                    reason: format!("{} must be finite and non-negative, got {}", name, fade),
                });
            }
        }
        Ok(Self {
            start: spec.start,
            end,
            clip_duration: spec.clip_duration,
            loop_policy: spec.loop_policy,
            fade_in: spec.fade_in,
            fade_out: spec.fade_out,
            handle: AnimationHandle::default(),
        })
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Scene-timeline stop instant; `f64::INFINITY` for open-ended windows.
    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    #[inline]
    pub fn clip_duration(&self) -> f64 {
        self.clip_duration
    }

    #[inline]
    pub fn loop_policy(&self) -> LoopPolicy {
        self.loop_policy
    }

    #[inline]
    pub fn fade_in(&self) -> f64 {
        self.fade_in
    }

    #[inline]
    pub fn fade_out(&self) -> f64 {
        self.fade_out
    }

    #[inline]
    pub fn is_open_ended(&self) -> bool {
        self.end == OPEN_END
    }

    /// Whether `time` lies inside the scheduled interval `[start, end)`.
    #[inline]
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }

    /// Local time cursor for a timeline position at or past `start`,
    /// applying this window's loop policy. An elapsed one-shot pins the
    /// cursor to `clip_duration` so the held frame stays constant even when
    /// the window truncates the clip.
    #[inline]
    pub fn local_time_at(&self, time: f64) -> f64 {
        match self.loop_policy {
            LoopPolicy::OneShot if time >= self.end => self.clip_duration,
            LoopPolicy::OneShot => (time - self.start).min(self.clip_duration),
            LoopPolicy::Repeat => wrap(time - self.start, self.clip_duration),
        }
    }

    /// Blend weight at a timeline position, from the edge fade ramps.
    /// The fade-out ramp only applies to windows with a finite stop instant.
    pub fn weight_at(&self, time: f64) -> f32 {
        let mut weight = 1.0f64;
        if self.fade_in > 0.0 {
            weight = weight.min(((time - self.start) / self.fade_in).clamp(0.0, 1.0));
        }
        if self.fade_out > 0.0 && self.end.is_finite() {
            weight = weight.min(((self.end - time) / self.fade_out).clamp(0.0, 1.0));
        }
        weight as f32
    }
}

/// One target key's ordered window list.
#[derive(Debug, Clone, Default)]
pub struct RegistryEntry {
    pub target_key: String,
    pub windows: Vec<ClipWindow>,
}

/// Mapping from target key to its authored sequence of windows.
///
/// Entries and windows stay in authoring (insertion) order; they are never
/// sorted by start time. The engine's reverse priority scan uses that order
/// as its tie-break, so a later-authored overlapping window always wins.
#[derive(Debug, Clone, Default)]
pub struct AnimationRegistry {
    entries: Vec<RegistryEntry>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a window to `target_key`'s list, creating the entry at the
    /// tail on first sight of the key.
    pub fn push_window(&mut self, target_key: impl Into<String>, window: ClipWindow) {
        let target_key = target_key.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.target_key == target_key)
        {
            entry.windows.push(window);
        } else {
            self.entries.push(RegistryEntry {
                target_key,
                windows: vec![window],
            });
        }
    }

    #[inline]
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    #[inline]
    pub fn entries_mut(&mut self) -> &mut [RegistryEntry] {
        &mut self.entries
    }

    pub fn get(&self, target_key: &str) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.target_key == target_key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of windows across all targets.
    pub fn window_count(&self) -> usize {
        self.entries.iter().map(|e| e.windows.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn spec(start: f64, end: Option<f64>, clip_duration: f64) -> WindowSpec {
        WindowSpec {
            start,
            end,
            clip_duration,
            loop_policy: LoopPolicy::OneShot,
            fade_in: 0.0,
            fade_out: 0.0,
        }
    }

    #[test]
    fn test_window_validation() {
        assert!(ClipWindow::from_spec(spec(0.0, Some(2.0), 2.0)).is_ok());
        assert!(ClipWindow::from_spec(spec(0.0, None, 5.0)).is_ok());
        // zero-duration repeat is legal; it reads as a constant pose
        assert!(ClipWindow::from_spec(WindowSpec {
            loop_policy: LoopPolicy::Repeat,
            ..spec(0.0, None, 0.0)
        })
        .is_ok());

        assert!(ClipWindow::from_spec(spec(3.0, Some(1.0), 2.0)).is_err());
        assert!(ClipWindow::from_spec(spec(-1.0, Some(1.0), 2.0)).is_err());
        assert!(ClipWindow::from_spec(spec(0.0, Some(1.0), -2.0)).is_err());
        assert!(ClipWindow::from_spec(spec(f64::NAN, Some(1.0), 2.0)).is_err());
        assert!(ClipWindow::from_spec(WindowSpec {
            fade_in: -0.5,
            ..spec(0.0, Some(1.0), 1.0)
        })
        .is_err());
    }

    #[test]
    fn test_local_time_policies() {
        let one_shot = ClipWindow::from_spec(spec(1.0, Some(3.0), 2.0)).unwrap();
        assert_abs_diff_eq!(one_shot.local_time_at(1.5), 0.5);
        assert_abs_diff_eq!(one_shot.local_time_at(4.0), 2.0); // held final frame

        // a window shorter than its clip still pins the held frame
        let truncated = ClipWindow::from_spec(spec(0.0, Some(1.0), 2.0)).unwrap();
        assert_abs_diff_eq!(truncated.local_time_at(0.5), 0.5);
        assert_abs_diff_eq!(truncated.local_time_at(1.2), 2.0);
        assert_abs_diff_eq!(truncated.local_time_at(9.0), 2.0);

        let repeat = ClipWindow::from_spec(WindowSpec {
            loop_policy: LoopPolicy::Repeat,
            ..spec(0.0, None, 5.0)
        })
        .unwrap();
        assert_abs_diff_eq!(repeat.local_time_at(7.0), 2.0);
        assert_abs_diff_eq!(repeat.local_time_at(10.0), 0.0);
        assert_abs_diff_eq!(repeat.local_time_at(5.5), 0.5);
    }

    #[test]
    fn test_fade_weights() {
        let window = ClipWindow::from_spec(WindowSpec {
            fade_in: 1.0,
            fade_out: 0.5,
            ..spec(2.0, Some(6.0), 4.0)
        })
        .unwrap();
        assert_abs_diff_eq!(window.weight_at(2.0), 0.0);
        assert_abs_diff_eq!(window.weight_at(2.5), 0.5);
        assert_abs_diff_eq!(window.weight_at(4.0), 1.0);
        assert_abs_diff_eq!(window.weight_at(5.75), 0.5);
        assert_abs_diff_eq!(window.weight_at(6.0), 0.0);

        // open-ended windows never fade out
        let open = ClipWindow::from_spec(WindowSpec {
            fade_out: 0.5,
            ..spec(0.0, None, 4.0)
        })
        .unwrap();
        assert_abs_diff_eq!(open.weight_at(100.0), 1.0);
    }

    #[test]
    fn test_registry_preserves_authoring_order() {
        let mut registry = AnimationRegistry::new();
        // deliberately author the later interval first
        registry.push_window("torso", ClipWindow::from_spec(spec(5.0, Some(8.0), 3.0)).unwrap());
        registry.push_window("torso", ClipWindow::from_spec(spec(0.0, Some(3.0), 3.0)).unwrap());
        registry.push_window("head", ClipWindow::from_spec(spec(0.0, None, 1.0)).unwrap());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.window_count(), 3);
        let torso = registry.get("torso").unwrap();
        assert_eq!(torso.windows[0].start(), 5.0);
        assert_eq!(torso.windows[1].start(), 0.0);
    }
}
