//! Scene compilation: declarative actions → an [`AnimationRegistry`].
//!
//! Actions are a tagged variant over their clip source so the engine stays
//! free of per-kind branching. Compilation is a total function: every failure
//! (missing target, unknown clip, invalid window maths) is logged and the
//! action skipped, never an error return.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TimelineError;
use crate::registry::{AnimationRegistry, ClipWindow, LoopPolicy, WindowSpec};

/// Opaque resolved target handle (small string key).
pub type TargetHandle = String;

/// Trait for resolving a declarative target key to a live scene object.
/// Hosts implement this against their scene graph and pass it into
/// [`compile_actions`]; returning `None` skips the action.
pub trait TargetResolver {
    fn resolve(&mut self, target_key: &str) -> Option<TargetHandle>;
}

/// Where an action's clip data comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActionPayload {
    /// Keyframe clip authored inline; carries its own intrinsic length.
    Keyframe { clip_duration: f64 },
    /// Named clip embedded in a loaded asset's clip library.
    SkeletalClip { asset: String, clip: String },
}

/// One declarative animation action on the scene timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub target_key: String,
    pub start: f64,
    /// `None` runs to the end of the scene.
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub loop_policy: LoopPolicy,
    #[serde(default)]
    pub fade_in: f64,
    #[serde(default)]
    pub fade_out: f64,
    pub payload: ActionPayload,
}

/// Clip libraries embedded in loaded assets: asset → clip name → intrinsic
/// duration in seconds.
#[derive(Debug, Clone, Default)]
pub struct ClipLibrary {
    assets: HashMap<String, HashMap<String, f64>>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one asset's clips, replacing any previous registration.
    pub fn add_asset(
        &mut self,
        asset: impl Into<String>,
        clips: impl IntoIterator<Item = (String, f64)>,
    ) {
        self.assets.insert(asset.into(), clips.into_iter().collect());
    }

    /// Intrinsic duration of a named clip, if the asset embeds it.
    pub fn clip_duration(&self, asset: &str, clip: &str) -> Option<f64> {
        self.assets.get(asset).and_then(|c| c.get(clip)).copied()
    }
}

/// Resolve one action's intrinsic clip duration.
fn payload_duration(
    payload: &ActionPayload,
    library: &ClipLibrary,
) -> Result<f64, TimelineError> {
    match payload {
        ActionPayload::Keyframe { clip_duration } => Ok(*clip_duration),
        ActionPayload::SkeletalClip { asset, clip } => library
            .clip_duration(asset, clip)
            .ok_or_else(|| TimelineError::ClipNotFound {
                asset: asset.clone(),
                clip: clip.clone(),
            }),
    }
}

/// Compile an authored action list into the registry the engine is loaded
/// with. Authoring order is preserved per target key; the engine's reverse
/// priority scan depends on it.
pub fn compile_actions(
    actions: &[Action],
    resolver: &mut dyn TargetResolver,
    library: &ClipLibrary,
) -> AnimationRegistry {
    let mut registry = AnimationRegistry::new();

    for action in actions {
        let Some(handle) = resolver.resolve(&action.target_key) else {
            let err = TimelineError::MissingTarget {
                target: action.target_key.clone(),
            };
            warn!(category = err.category(), "{err}; skipping action");
            continue;
        };

        let clip_duration = match payload_duration(&action.payload, library) {
            Ok(d) => d,
            Err(err) => {
                warn!(
                    category = err.category(),
                    target = %action.target_key,
                    "{err}; skipping action"
                );
                continue;
            }
        };

        let spec = WindowSpec {
            start: action.start,
            end: action.end,
            clip_duration,
            loop_policy: action.loop_policy,
            fade_in: action.fade_in,
            fade_out: action.fade_out,
        };
        match ClipWindow::from_spec(spec) {
            Ok(window) => registry.push_window(handle, window),
            Err(err) => {
                warn!(
                    category = err.category(),
                    target = %action.target_key,
                    "{err}; skipping action"
                );
            }
        }
    }

    registry
}
