use approx::assert_abs_diff_eq;
use timeline_sync::{
    compile_actions, loaders::parse_scene_actions_json, ClipLibrary, LoopPolicy, TargetHandle,
    TargetResolver, TimelineClock, TimelineEngine,
};

/// Resolver backed by a fixed scene-object list, echoing the key back as the
/// handle.
struct SceneStub {
    objects: Vec<&'static str>,
}

impl TargetResolver for SceneStub {
    fn resolve(&mut self, target_key: &str) -> Option<TargetHandle> {
        self.objects
            .iter()
            .find(|o| **o == target_key)
            .map(|o| o.to_string())
    }
}

const SCENE_DOC: &str = r#"[
    {
        "kind": "keyframe",
        "target": "arm",
        "start": 0.0,
        "end": 3.0,
        "clipDuration": 3.0
    },
    {
        "kind": "skeletal-clip",
        "target": "arm",
        "start": 5.0,
        "end": 8.0,
        "asset": "robot.glb",
        "clip": "wave"
    },
    {
        "kind": "skeletal-clip",
        "target": "legs",
        "start": 0.0,
        "loop": "repeat",
        "asset": "robot.glb",
        "clip": "walk"
    },
    {
        "kind": "speech",
        "target": "mouth",
        "start": 1.0,
        "text": "hello there"
    },
    {
        "kind": "keyframe",
        "target": "antenna",
        "start": 0.0,
        "clipDuration": 1.0
    }
]"#;

fn library() -> ClipLibrary {
    let mut library = ClipLibrary::new();
    library.add_asset(
        "robot.glb",
        [("wave".to_string(), 3.0), ("walk".to_string(), 1.5)],
    );
    library
}

#[test]
fn test_document_to_registry() {
    let actions = parse_scene_actions_json(SCENE_DOC).unwrap();
    // the speech action has no engine support and was dropped by the loader
    assert_eq!(actions.len(), 4);

    // "antenna" is not in the scene; its action is skipped at compile time
    let mut scene = SceneStub {
        objects: vec!["arm", "legs"],
    };
    let registry = compile_actions(&actions, &mut scene, &library());

    assert_eq!(registry.len(), 2);
    let arm = registry.get("arm").unwrap();
    assert_eq!(arm.windows.len(), 2);
    assert_eq!(arm.windows[1].clip_duration(), 3.0); // from the clip library
    let legs = registry.get("legs").unwrap();
    assert_eq!(legs.windows[0].loop_policy(), LoopPolicy::Repeat);
    assert!(legs.windows[0].is_open_ended());
}

#[test]
fn test_compiled_scene_plays_end_to_end() {
    let actions = parse_scene_actions_json(SCENE_DOC).unwrap();
    let mut scene = SceneStub {
        objects: vec!["arm", "legs"],
    };
    let registry = compile_actions(&actions, &mut scene, &library());

    let mut engine = TimelineEngine::new(TimelineClock::new());
    engine.load(registry);

    // scrub into the gap between the two arm segments: the keyframe segment
    // holds its final frame while the walk cycle keeps wrapping
    engine.seek(4.0).unwrap();
    let arm = engine.registry().get("arm").unwrap();
    assert!(arm.windows[0].handle.enabled);
    assert_abs_diff_eq!(arm.windows[0].handle.local_time, 3.0);
    assert!(!arm.windows[1].handle.enabled);
    let legs = engine.registry().get("legs").unwrap();
    assert_abs_diff_eq!(legs.windows[0].handle.local_time, 1.0); // wrap(4, 1.5)

    // playback across the second segment's start activates it
    engine.play();
    let out = engine.update(1.5);
    let wave = out
        .samples
        .iter()
        .find(|s| s.target_key == "arm")
        .unwrap();
    let (wave_window, wave_local_time) = (wave.window, wave.local_time);
    assert_abs_diff_eq!(engine.get_position(), 5.5);
    assert_eq!(wave_window, 1);
    assert_abs_diff_eq!(wave_local_time, 0.5, epsilon = 1e-9);
}

#[test]
fn test_empty_document() {
    let actions = parse_scene_actions_json("[]").unwrap();
    assert!(actions.is_empty());
    let mut scene = SceneStub { objects: vec![] };
    let registry = compile_actions(&actions, &mut scene, &ClipLibrary::new());
    assert!(registry.is_empty());
}
