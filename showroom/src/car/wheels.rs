use std::f32::consts::TAU;

use cgmath::{Matrix4, Point3, Rad, SquareMatrix};
use showroom_util::collision::AABB;
use showroom_util::math::{invert_or_identity, matrix_translation};

use super::steering::SteeringState;
use crate::data::{BlurredObject, WheelDescriptor, WheelPosition};
use crate::scene::{NodeKey, NodeRole, SceneTree};

/// Kilometers per hour to meters per second.
const KPH_TO_MPS: f32 = 0.2778;

/// Advances a wheel's rolling angle by the distance traveled during
/// `delta_time`. The result is wrapped into `0..TAU`.
pub fn advance_roll(rotation: f32, speed_kph: f32, delta_time: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return rotation;
    }

    let distance = speed_kph * KPH_TO_MPS * delta_time;
    (rotation + distance / radius).rem_euclid(TAU)
}

/// Rolling state of the four wheels.
#[derive(Default)]
pub struct WheelsState {
    speed_kph: f32,
    rotations: [f32; 4],
}

impl WheelsState {
    pub fn speed(&self) -> f32 {
        self.speed_kph
    }

    pub fn set_speed(&mut self, speed_kph: f32) {
        self.speed_kph = speed_kph;
    }

    pub fn rotation(&self, position: WheelPosition) -> f32 {
        self.rotations[position.index()]
    }

    pub fn advance(&mut self, wheels: &[WheelDescriptor], delta_time: f32) {
        for wheel in wheels {
            let rotation = &mut self.rotations[wheel.position.index()];
            *rotation = advance_roll(*rotation, self.speed_kph, delta_time, wheel.radius);
        }
    }

    pub fn reset(&mut self) {
        self.rotations = [0.0; 4];
    }
}

/// How the wheel chains are placed.
pub struct WheelPlacement<'a> {
    pub wheels: &'a [WheelDescriptor],
    pub steering: &'a SteeringState,
    pub rolling: &'a WheelsState,
    pub align_by_data: bool,
    pub suspension_travel: bool,
    pub data_to_model: Matrix4<f32>,
}

impl WheelPlacement<'_> {
    fn descriptor(&self, position: WheelPosition) -> Option<&WheelDescriptor> {
        self.wheels.iter().find(|wheel| wheel.position == position)
    }

    /// Model space matrix of the wheel node before steering.
    fn wheel_model(&self, tree: &SceneTree, position: WheelPosition, key: NodeKey, rolling: bool) -> Matrix4<f32> {
        match self.descriptor(position).filter(|_| self.align_by_data) {
            Some(wheel) => {
                let roll = match rolling {
                    true => Matrix4::from_angle_x(Rad(self.rolling.rotation(position))),
                    false => Matrix4::identity(),
                };

                self.data_to_model * wheel.wheel_matrix(self.suspension_travel) * roll
            }
            None => tree.original_model_matrix(key),
        }
    }

    /// Unsteered model space wheel centers of the front axle, used to solve
    /// the steer pivots.
    pub fn front_centers(&self, tree: &SceneTree) -> [Option<Point3<f32>>; 2] {
        WheelPosition::FRONT.map(|position| {
            let key = tree.role(NodeRole::Wheel(position))?;
            let model = self.wheel_model(tree, position, key, false);
            Some(matrix_translation(&model))
        })
    }

    /// Moves the wheel, suspension, hub and disc nodes of every wheel. Nodes
    /// that are neither steered nor aligned return to their original
    /// transform.
    pub fn apply(&self, tree: &mut SceneTree) {
        let mut targets: Vec<(usize, NodeKey, Option<Matrix4<f32>>)> = Vec::new();

        for position in WheelPosition::ALL {
            let Some(wheel_key) = tree.role(NodeRole::Wheel(position)) else {
                continue;
            };

            let steer = self.steering.matrix(position);
            let steered = steer != Matrix4::identity();
            let original_wheel = tree.original_model_matrix(wheel_key);

            if !self.align_by_data && !steered {
                for role in [
                    NodeRole::Wheel(position),
                    NodeRole::Suspension(position),
                    NodeRole::Hub(position),
                    NodeRole::Disc(position),
                ] {
                    if let Some(key) = tree.role(role) {
                        targets.push((tree.depth(key), key, None));
                    }
                }

                continue;
            }

            let wheel_model = self.wheel_model(tree, position, wheel_key, true);
            let placement = self.wheel_model(tree, position, wheel_key, false) * invert_or_identity(&original_wheel);

            targets.push((tree.depth(wheel_key), wheel_key, Some(steer * wheel_model)));

            for role in [NodeRole::Suspension(position), NodeRole::Hub(position), NodeRole::Disc(position)] {
                let Some(key) = tree.role(role) else {
                    continue;
                };

                let original = tree.original_model_matrix(key);
                let model = match role {
                    NodeRole::Suspension(_) => placement * original,
                    _ => steer * placement * original,
                };

                targets.push((tree.depth(key), key, Some(model)));
            }
        }

        targets.sort_by_key(|(depth, ..)| *depth);

        for (_, key, model) in targets {
            match model {
                Some(model) => tree.set_model_matrix(key, model),
                None => tree.restore_original(key),
            }
        }
    }
}

/// Shows the blurred variant of a mesh matching the current speed. At rest
/// only the variants meant to be seen while standing are shown.
pub fn apply_blurred_objects(tree: &mut SceneTree, objects: &[BlurredObject], speed_kph: Option<f32>) {
    for object in objects {
        let Some(key) = tree.find(&object.name) else {
            continue;
        };

        let visible = match speed_kph {
            Some(speed) => object.is_visible_at(speed),
            None => object.is_visible_at_rest(),
        };

        tree.set_enabled(key, visible);
    }
}

/// Height the model has to be lifted by so that its wheels touch the ground.
/// Falls back to the lowest point of the model if no wheel node has any
/// extent.
pub fn ground_offset(tree: &SceneTree) -> f32 {
    let mut wheels = AABB::uninitialized();

    for position in WheelPosition::ALL {
        if let Some(key) = tree.role(NodeRole::Wheel(position)) {
            wheels.extend(&tree.bounding_box(key));
        }
    }

    if wheels.is_valid() && wheels.has_extent() {
        return -wheels.min().y;
    }

    let model = tree.root_bounding_box();

    match model.is_valid() {
        true => -model.min().y,
        false => 0.0,
    }
}
