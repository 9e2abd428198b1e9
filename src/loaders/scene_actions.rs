//! Loader for JSON scene-action documents.
//!
//! The document is an array of action objects discriminated by a string
//! `kind` field. Kinds the engine has no support for are warned about and
//! skipped so a scene authored against a newer toolset still loads; malformed
//! JSON is a hard parse error.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::compile::{Action, ActionPayload};
use crate::error::TimelineError;
use crate::registry::LoopPolicy;

#[derive(Deserialize)]
struct ActionDocCommon {
    #[serde(rename = "target")]
    target_key: String,
    start: f64,
    #[serde(default)]
    end: Option<f64>,
    #[serde(default, rename = "loop")]
    loop_policy: LoopPolicy,
    #[serde(default, rename = "fadeIn")]
    fade_in: f64,
    #[serde(default, rename = "fadeOut")]
    fade_out: f64,
}

#[derive(Deserialize)]
struct KeyframeDoc {
    #[serde(flatten)]
    common: ActionDocCommon,
    #[serde(rename = "clipDuration")]
    clip_duration: f64,
}

#[derive(Deserialize)]
struct SkeletalClipDoc {
    #[serde(flatten)]
    common: ActionDocCommon,
    asset: String,
    clip: String,
}

fn into_action(common: ActionDocCommon, payload: ActionPayload) -> Action {
    Action {
        target_key: common.target_key,
        start: common.start,
        end: common.end,
        loop_policy: common.loop_policy,
        fade_in: common.fade_in,
        fade_out: common.fade_out,
        payload,
    }
}

/// Parse a scene-action document into the action list fed to
/// [`crate::compile::compile_actions`].
///
/// # Example
/// ```rust
/// use timeline_sync::loaders::parse_scene_actions_json;
///
/// let json = r#"[
///   {
///     "kind": "keyframe",
///     "target": "torso",
///     "start": 0.0,
///     "end": 2.0,
///     "clipDuration": 2.0
///   },
///   {
///     "kind": "skeletal-clip",
///     "target": "torso",
///     "start": 2.0,
///     "loop": "repeat",
///     "asset": "robot.glb",
///     "clip": "walk"
///   }
/// ]"#;
///
/// let actions = parse_scene_actions_json(json).unwrap();
/// assert_eq!(actions.len(), 2);
/// ```
pub fn parse_scene_actions_json(json: &str) -> Result<Vec<Action>, TimelineError> {
    let docs: Vec<Value> = serde_json::from_str(json)?;
    let mut actions = Vec::with_capacity(docs.len());

    for doc in docs {
        let kind = doc
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        match kind.as_str() {
            "keyframe" => {
                let parsed: KeyframeDoc = serde_json::from_value(doc)?;
                let payload = ActionPayload::Keyframe {
                    clip_duration: parsed.clip_duration,
                };
                actions.push(into_action(parsed.common, payload));
            }
            "skeletal-clip" => {
                let parsed: SkeletalClipDoc = serde_json::from_value(doc)?;
                let payload = ActionPayload::SkeletalClip {
                    asset: parsed.asset,
                    clip: parsed.clip,
                };
                actions.push(into_action(parsed.common, payload));
            }
            other => {
                let err = TimelineError::UnsupportedActionKind {
                    kind: other.to_string(),
                };
                warn!(category = err.category(), "{err}; skipping action");
            }
        }
    }

    Ok(actions)
}
