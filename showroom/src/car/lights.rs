use std::path::Path;

use cgmath::Vector3;
#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, print_debug};

use crate::data::{CarData, LightDescriptor, LightKind};
use crate::loaders::{Animator, AnimatorFactory};
use crate::scene::SceneTree;

/// Where light descriptors and their clips come from.
pub struct LightsSource<'a> {
    pub data: &'a dyn CarData,
    pub animators: &'a dyn AnimatorFactory,
    pub car_directory: &'a Path,
}

struct LightAnimator {
    kind: LightKind,
    animator: Box<dyn Animator>,
}

/// Headlight and brake light state. Descriptors and clips are only read
/// once a light was switched for the first time.
#[derive(Default)]
pub struct LightsState {
    headlights: bool,
    brake_lights: bool,
    touched: bool,
    descriptors: Option<Vec<LightDescriptor>>,
    animators: Option<Vec<LightAnimator>>,
}

fn position(enabled: bool) -> f32 {
    match enabled {
        true => 1.0,
        false => 0.0,
    }
}

impl LightsState {
    pub fn is_enabled(&self, kind: LightKind) -> bool {
        match kind {
            LightKind::Headlight => self.headlights,
            LightKind::Brake => self.brake_lights,
        }
    }

    #[cfg(test)]
    pub fn animator_count(&self) -> usize {
        self.animators.as_ref().map_or(0, Vec::len)
    }

    /// Switches a light kind. Everything the lights need is read before the
    /// state changes, so new clips start from the previous state. Returns
    /// false if nothing changed.
    pub fn set(&mut self, kind: LightKind, enabled: bool, source: &LightsSource) -> bool {
        if self.is_enabled(kind) == enabled {
            return false;
        }

        self.touched = true;
        self.ensure_loaded(source);

        match kind {
            LightKind::Headlight => self.headlights = enabled,
            LightKind::Brake => self.brake_lights = enabled,
        }

        true
    }

    /// Reads descriptors and clips that are missing, if any light was
    /// switched before.
    pub fn ensure_loaded(&mut self, source: &LightsSource) {
        if !self.touched {
            return;
        }

        if self.descriptors.is_none() {
            self.descriptors = Some(source.data.lights());
        }

        if self.animators.is_none() {
            let animators = source
                .data
                .lights_animations()
                .into_iter()
                .filter_map(|descriptor| {
                    let path = source.car_directory.join("animations").join(&descriptor.file);

                    let Some(mut animator) = source.animators.create_animator(&path, descriptor.duration, true, false) else {
                        #[cfg(feature = "debug")]
                        print_debug!("[{}] light animation {} unavailable", "error".red(), path.display().magenta());

                        return None;
                    };

                    animator.set_immediate(position(self.is_enabled(descriptor.kind)));

                    Some(LightAnimator {
                        kind: descriptor.kind,
                        animator,
                    })
                })
                .collect();

            self.animators = Some(animators);
        }
    }

    /// Writes the emissive colors into the tree and points the clips at the
    /// current state.
    pub fn apply(&mut self, tree: &mut SceneTree) {
        if let Some(descriptors) = &self.descriptors {
            for descriptor in descriptors {
                let Some(key) = tree.find(&descriptor.name) else {
                    continue;
                };

                let emissive = descriptor
                    .emissive(self.headlights, self.brake_lights)
                    .map(Vector3::from);

                tree.set_emissive(key, emissive);
            }
        }

        let (headlights, brake_lights) = (self.headlights, self.brake_lights);

        for light in self.animators.iter_mut().flatten() {
            let enabled = match light.kind {
                LightKind::Headlight => headlights,
                LightKind::Brake => brake_lights,
            };

            light.animator.set_target(position(enabled));
        }
    }

    pub fn update(&mut self, tree: &mut SceneTree, delta_time: f32) {
        for light in self.animators.iter_mut().flatten() {
            light.animator.update(tree, delta_time);
        }
    }

    /// Drops cached descriptors or clips after their data changed.
    pub fn invalidate(&mut self, descriptors: bool, animations: bool) {
        if descriptors {
            self.descriptors = None;
        }

        if animations {
            self.animators = None;
        }
    }
}
