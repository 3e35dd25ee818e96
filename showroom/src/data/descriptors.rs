use std::path::PathBuf;

use cgmath::{Matrix4, Point3, Vector3};
use derive_new::new;

use crate::graphics::Color;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LightKind {
    Headlight,
    Brake,
}

/// Emissive node that glows while headlights or brake lights are on.
#[derive(new, Clone, Debug, PartialEq)]
pub struct LightDescriptor {
    pub name: String,
    pub headlight_color: Option<Color>,
    pub brake_color: Option<Color>,
}

impl LightDescriptor {
    /// Color the node emits for the given light state, if any.
    pub fn emissive(&self, headlights: bool, brake_lights: bool) -> Option<Color> {
        let headlight = self.headlight_color.filter(|_| headlights);
        let brake = self.brake_color.filter(|_| brake_lights);

        match (headlight, brake) {
            (Some(headlight), Some(brake)) => Some(Color::rgb(
                headlight.red + brake.red,
                headlight.green + brake.green,
                headlight.blue + brake.blue,
            )),
            (headlight, brake) => headlight.or(brake),
        }
    }
}

/// Keyframe clip played when a light kind is toggled, for example pop-up
/// headlights.
#[derive(new, Clone, Debug, PartialEq)]
pub struct LightAnimationDescriptor {
    pub file: String,
    pub duration: f32,
    pub kind: LightKind,
}

#[derive(new, Clone, Debug, PartialEq)]
pub struct DriverDescription {
    /// File stem of the driver model inside `<content>/driver`.
    pub name: String,
    /// Placement of the driver relative to the car.
    pub transform: Matrix4<f32>,
    /// Base pose hierarchy, relative to the car directory.
    pub hierarchy: Option<PathBuf>,
}

#[derive(new, Clone, Debug, PartialEq)]
pub struct ExtraCamera {
    pub name: String,
    pub position: Point3<f32>,
    pub look: Vector3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

/// High speed variant of a mesh, visible while
/// `min_speed <= |speed| < max_speed`.
#[derive(new, Clone, Debug, PartialEq)]
pub struct BlurredObject {
    pub name: String,
    pub wheel_index: usize,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl BlurredObject {
    pub fn is_visible_at(&self, speed: f32) -> bool {
        let speed = speed.abs();
        self.min_speed <= speed && speed < self.max_speed
    }

    /// Visibility while wheel speed is not simulated.
    pub fn is_visible_at_rest(&self) -> bool {
        self.min_speed <= 0.0
    }
}

#[derive(new, Clone, Debug, PartialEq)]
pub struct LodDescriptor {
    /// Model file relative to the car directory. Empty for the initially
    /// supplied tree.
    pub file: String,
    pub distance_in: f32,
    pub distance_out: f32,
}

#[derive(new, Copy, Clone, Debug, PartialEq)]
pub struct ColliderDescriptor {
    pub center: Point3<f32>,
    pub size: Vector3<f32>,
}

#[derive(new, Clone, Debug, PartialEq)]
pub struct WingDescriptor {
    pub name: String,
    pub position: Point3<f32>,
    pub chord: f32,
    pub span: f32,
    /// Angle of attack in degrees.
    pub angle: f32,
}

#[derive(new, Copy, Clone, Debug, PartialEq)]
pub struct FlameDescriptor {
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
}

/// Model space anchors of the sound emitters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SoundEmitterOffsets {
    pub engine: Point3<f32>,
    pub horn: Point3<f32>,
    pub body: Point3<f32>,
}

impl Default for SoundEmitterOffsets {
    fn default() -> Self {
        Self {
            engine: Point3::new(0.0, 0.4, 1.2),
            horn: Point3::new(0.0, 0.4, 2.0),
            body: Point3::new(0.0, 0.5, 0.0),
        }
    }
}
