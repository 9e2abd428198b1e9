//! Loaders for declarative scene description formats.

pub mod scene_actions;

pub use scene_actions::parse_scene_actions_json;
