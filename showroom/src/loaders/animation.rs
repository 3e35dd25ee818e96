use std::path::Path;

use crate::scene::SceneTree;

/// Keyframe clip player bound to one car tree.
pub trait Animator: Send {
    /// Blends towards the normalized clip position.
    fn set_target(&mut self, position: f32);

    /// Jumps to the normalized clip position without blending.
    fn set_immediate(&mut self, position: f32);

    /// Plays the clip in a loop until a target is set.
    fn play_loop(&mut self);

    /// Current normalized clip position.
    fn position(&self) -> f32;

    /// Advances the clip and writes the animated transforms into the tree.
    /// Returns true if any node moved.
    fn update(&mut self, tree: &mut SceneTree, delta_time: f32) -> bool;
}

pub trait AnimatorFactory: Send + Sync {
    /// Returns [`None`] if the clip is missing or malformed.
    fn create_animator(&self, path: &Path, duration: f32, clamp: bool, skip_fixed: bool) -> Option<Box<dyn Animator>>;
}
