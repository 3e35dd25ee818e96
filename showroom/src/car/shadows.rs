use std::path::{Path, PathBuf};
use std::sync::Arc;

use cgmath::{Matrix4, Point3, Rad, Vector2, Vector3};
use showroom_util::collision::AABB;
use showroom_util::container::ResourceState;
use showroom_util::math::{matrix_translation, multiply_matrix4_and_point3, yaw_of_matrix};

use super::steering::SteeringState;
use crate::data::{WheelDescriptor, WheelPosition};
use crate::graphics::{ShadowInstruction, Texture};
use crate::loaders::{LoadError, TextureLoader};
use crate::scene::{NodeRole, SceneTree};

/// Extra room around the body when the shadow is sized from the bounding
/// box.
const BODY_MARGIN: f32 = 1.1;

/// Half size of the body shadow quad on the X and Z axes.
pub fn body_shadow_scale(bounds: &AABB, explicit: Option<Vector2<f32>>, margin: f32) -> Vector2<f32> {
    if let Some(size) = explicit {
        return size;
    }

    match bounds.is_valid() {
        true => {
            let half_size = bounds.half_size();
            Vector2::new(half_size.x * margin, half_size.z * margin)
        }
        false => Vector2::new(0.0, 0.0),
    }
}

/// Half size of a wheel shadow quad. `size` scales the dimensions derived
/// from the wheel.
pub fn wheel_shadow_scale(wheel: &WheelDescriptor, size: Option<Vector2<f32>>) -> Vector2<f32> {
    let size = size.unwrap_or(Vector2::new(1.0, 1.0));
    Vector2::new(wheel.width * 0.5 * size.x, wheel.radius * size.y)
}

type ShadowTexture = ResourceState<Arc<Texture>, LoadError>;

/// Body and wheel shadow quads. Their textures are read from the car
/// directory on first draw and skipped if they do not exist.
pub struct AmbientShadows {
    car_directory: PathBuf,
    body: ShadowTexture,
    wheels: [ShadowTexture; 4],
}

/// Car state the shadows are placed from.
pub struct ShadowFrame<'a> {
    pub tree: &'a SceneTree,
    /// Model space bounds of the car body without anything grafted into it.
    pub bounds: AABB,
    pub wheels: &'a [WheelDescriptor],
    pub steering: &'a SteeringState,
    pub body_size: Option<Vector2<f32>>,
    pub wheel_size: Option<Vector2<f32>>,
    /// World height of the quads.
    pub height: f32,
}

fn texture<'a>(slot: &'a mut ShadowTexture, texture_loader: &TextureLoader, path: &Path) -> Option<&'a Arc<Texture>> {
    slot.get_or_load(|| texture_loader.load_file(path)).map(|texture| &*texture)
}

fn quad(placement: &Matrix4<f32>, center: Point3<f32>, yaw: Rad<f32>, scale: Vector2<f32>, height: f32) -> Matrix4<f32> {
    let position = multiply_matrix4_and_point3(placement, Point3::new(center.x, 0.0, center.z));

    Matrix4::from_translation(Vector3::new(position.x, height, position.z))
        * Matrix4::from_angle_y(yaw)
        * Matrix4::from_nonuniform_scale(scale.x, 1.0, scale.y)
}

impl AmbientShadows {
    pub fn new(car_directory: PathBuf) -> Self {
        Self {
            car_directory,
            body: ResourceState::Unloaded,
            wheels: Default::default(),
        }
    }

    /// Reads the textures again on next draw.
    pub fn reset(&mut self) {
        self.body.reset();
        self.wheels.iter_mut().for_each(ResourceState::reset);
    }

    pub fn emit(&mut self, frame: &ShadowFrame, texture_loader: &TextureLoader, output: &mut Vec<ShadowInstruction>) {
        let placement = frame.tree.transform();
        let car_yaw = yaw_of_matrix(&placement);

        let body_path = self.car_directory.join("body_shadow.png");

        if let Some(texture) = texture(&mut self.body, texture_loader, &body_path) {
            let scale = body_shadow_scale(&frame.bounds, frame.body_size, BODY_MARGIN);

            if frame.bounds.is_valid() {
                output.push(ShadowInstruction {
                    world: quad(&placement, frame.bounds.center(), car_yaw, scale, frame.height),
                    texture: Some(texture.clone()),
                    opacity: 1.0,
                });
            }
        }

        for wheel in frame.wheels {
            let position = wheel.position;
            let path = self.car_directory.join(format!("tyre_{}_shadow.png", position.index()));

            let Some(texture) = texture(&mut self.wheels[position.index()], texture_loader, &path) else {
                continue;
            };

            let center = match frame.tree.role(NodeRole::Wheel(position)) {
                Some(key) => matrix_translation(&frame.tree.original_model_matrix(key)),
                None => wheel.center_at_ride_height,
            };

            let steer_yaw = match position.is_front() {
                true => yaw_of_matrix(&frame.steering.matrix(position)),
                false => Rad(0.0),
            };

            output.push(ShadowInstruction {
                world: quad(
                    &placement,
                    center,
                    car_yaw + steer_yaw,
                    wheel_shadow_scale(wheel, frame.wheel_size),
                    frame.height,
                ),
                texture: Some(texture.clone()),
                opacity: 1.0,
            });
        }
    }

    /// Returns true if the shadow texture of a wheel failed to load.
    #[cfg(test)]
    pub fn is_missing(&self, position: WheelPosition) -> bool {
        self.wheels[position.index()].is_failed()
    }
}
