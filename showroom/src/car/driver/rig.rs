use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix3, Matrix4, Point3, Quaternion, Vector3};
use showroom_util::math::{inverse_rotation, look_rotation, matrix_translation};
use smallvec::SmallVec;

use super::grip::{ArmPose, GripInput, HandSide};
use crate::scene::{NodeKey, SceneTree};
use crate::settings::GripSettings;

const FINGERS: [&str; 4] = ["Index", "Middle", "Ring", "Pinkie"];

type FingerChain = SmallVec<[NodeKey; 3]>;

/// Rotation turning `from` into `to`. The `pole` keeps the twist stable; if
/// it is parallel to either direction the shortest arc is used instead.
fn rotation_between(from: Vector3<f32>, to: Vector3<f32>, pole: Vector3<f32>) -> Matrix3<f32> {
    match (look_rotation(to, pole), look_rotation(from, pole)) {
        (Some(target), Some(source)) => target * inverse_rotation(&source),
        _ => Matrix3::from(Quaternion::from_arc(from.normalize(), to.normalize(), None)),
    }
}

/// Model matrix of a bone that was rotated by `rotation` around its bind
/// position and moved to `position`.
fn posed_bone(original: Matrix4<f32>, position: Point3<f32>, rotation: Matrix3<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(position.to_vec())
        * Matrix4::from(rotation)
        * Matrix4::from_translation(-matrix_translation(&original).to_vec())
        * original
}

/// Dummies of one arm of the driver, bound by name.
pub struct ArmRig {
    side: HandSide,
    shoulder: NodeKey,
    arm: NodeKey,
    forearm: NodeKey,
    forearm_end: NodeKey,
    hand: NodeKey,
    fingers: SmallVec<[FingerChain; 4]>,
}

impl ArmRig {
    /// Returns [`None`] if any dummy of the arm itself is missing. Missing
    /// finger segments only shorten their chain.
    pub fn bind(tree: &SceneTree, side: HandSide) -> Option<Self> {
        let suffix = side.suffix();
        let find = |name: &str| tree.find(&format!("DRIVER:{name}_{suffix}"));

        let fingers = FINGERS
            .iter()
            .map(|finger| {
                (1..=3)
                    .map_while(|segment| tree.find(&format!("DRIVER:HAND_{suffix}_{finger}{segment}")))
                    .collect::<FingerChain>()
            })
            .filter(|chain| !chain.is_empty())
            .collect();

        Some(Self {
            side,
            shoulder: find("RIG_Shoulder")?,
            arm: find("RIG_Arm")?,
            forearm: find("RIG_ForeArm")?,
            forearm_end: find("RIG_ForeArm_END")?,
            hand: find("RIG_HAND")?,
            fingers,
        })
    }

    #[cfg(test)]
    pub fn side(&self) -> HandSide {
        self.side
    }

    #[cfg(test)]
    pub fn finger_count(&self) -> usize {
        self.fingers.len()
    }

    fn bind_position(tree: &SceneTree, key: NodeKey) -> Point3<f32> {
        matrix_translation(&tree.original_model_matrix(key))
    }

    /// Describes the arm's bind pose for the solver.
    pub fn input(
        &self,
        tree: &SceneTree,
        target: Point3<f32>,
        wheel_center: Point3<f32>,
        wheel_axis: Vector3<f32>,
        wheel_up: Vector3<f32>,
    ) -> GripInput {
        let arm = Self::bind_position(tree, self.arm);
        let forearm = Self::bind_position(tree, self.forearm);
        let forearm_end = Self::bind_position(tree, self.forearm_end);
        let hand = Self::bind_position(tree, self.hand);

        GripInput {
            side: self.side,
            shoulder: arm,
            upper_length: (forearm - arm).magnitude(),
            // Measured along the forearm chain, which is longer than the
            // straight line if the end dummy sits off axis.
            lower_length: (forearm_end - forearm).magnitude() + (hand - forearm_end).magnitude(),
            target,
            wheel_center,
            wheel_axis,
            wheel_up,
        }
    }

    /// Writes a solved pose into the tree.
    pub fn apply(&self, tree: &mut SceneTree, pose: &ArmPose, settings: &GripSettings) {
        let pole = Vector3::new(self.side.sign(), 0.0, 0.0);

        let shoulder = tree.original_model_matrix(self.shoulder);
        let arm = tree.original_model_matrix(self.arm);
        let forearm = tree.original_model_matrix(self.forearm);
        let hand = tree.original_model_matrix(self.hand);

        let arm_position = matrix_translation(&arm);
        let forearm_position = matrix_translation(&forearm);
        let hand_position = matrix_translation(&hand);

        let drop = pose.shoulder - arm_position;
        tree.set_model_matrix(self.shoulder, Matrix4::from_translation(drop) * shoulder);

        let upper_rotation = rotation_between(forearm_position - arm_position, pose.elbow - pose.shoulder, pole);
        tree.set_model_matrix(self.arm, posed_bone(arm, pose.shoulder, upper_rotation));

        let lower_rotation = rotation_between(hand_position - forearm_position, pose.wrist - pose.elbow, pole);
        tree.set_model_matrix(self.forearm, posed_bone(forearm, pose.elbow, lower_rotation));

        let bind_forward = hand.z.truncate();
        let bind_up = hand.y.truncate();

        if let (Some(target), Some(source)) = (look_rotation(pose.hand_forward, pose.hand_up), look_rotation(bind_forward, bind_up)) {
            tree.set_model_matrix(self.hand, posed_bone(hand, pose.wrist, target * inverse_rotation(&source)));
        }

        for chain in &self.fingers {
            for (segment, key) in chain.iter().enumerate() {
                let weight = settings.segment_weights.get(segment).copied().unwrap_or_default();
                let angle = pose.finger_curl * settings.finger_curl_degrees * weight;

                if let Some(original) = tree.original_local(*key) {
                    tree.set_local(*key, original * Matrix4::from_angle_z(Deg(angle)));
                }
            }
        }
    }

    /// Keys of every dummy this rig moves, in the order they are written.
    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        [self.shoulder, self.arm, self.forearm, self.forearm_end, self.hand]
            .into_iter()
            .chain(self.fingers.iter().flatten().copied())
    }
}
