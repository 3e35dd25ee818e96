//! Approximate arm and hand kinematics for a driver holding the steering
//! wheel.
//!
//! This is not a general inverse kinematics solver. The numbers in
//! [`GripSettings`] are tuned by eye and the solver sits behind
//! [`DriverGripSolver`] so it can be replaced.

use std::f32::consts::FRAC_PI_2;

use cgmath::{Deg, InnerSpace, Matrix3, Point3, Rad, Vector3};
use showroom_util::math::smoothstep;

use crate::settings::GripSettings;

const EPSILON: f32 = 1e-5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub const BOTH: [HandSide; 2] = [HandSide::Left, HandSide::Right];

    /// +1 for the left and -1 for the right side.
    pub fn sign(self) -> f32 {
        match self {
            HandSide::Left => 1.0,
            HandSide::Right => -1.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            HandSide::Left => "L",
            HandSide::Right => "R",
        }
    }
}

/// Everything the solver needs to know about one arm, in model space.
#[derive(Copy, Clone, Debug)]
pub struct GripInput {
    pub side: HandSide,
    /// Root of the upper arm in its bind pose.
    pub shoulder: Point3<f32>,
    pub upper_length: f32,
    pub lower_length: f32,
    /// Point on the rim the palm should rest on.
    pub target: Point3<f32>,
    pub wheel_center: Point3<f32>,
    /// Normalized rotation axis of the steering wheel.
    pub wheel_axis: Vector3<f32>,
    /// Direction from the center to the top of the unsteered wheel.
    pub wheel_up: Vector3<f32>,
}

/// Solved arm, in model space.
#[derive(Copy, Clone, Debug)]
pub struct ArmPose {
    pub shoulder: Point3<f32>,
    pub elbow: Point3<f32>,
    pub wrist: Point3<f32>,
    pub hand_forward: Vector3<f32>,
    pub hand_up: Vector3<f32>,
    /// From 0 (open) to 1 (fist).
    pub finger_curl: f32,
}

pub trait DriverGripSolver: Send {
    /// Returns [`None`] if the arm can not be posed, in which case it keeps
    /// its previous pose.
    fn solve(&self, input: &GripInput, settings: &GripSettings) -> Option<ArmPose>;
}

/// Leaves the driver in its base pose.
pub struct NoGripSolver;

impl DriverGripSolver for NoGripSolver {
    fn solve(&self, _input: &GripInput, _settings: &GripSettings) -> Option<ArmPose> {
        None
    }
}

/// Eases distances approaching `maximum` instead of clamping them hard, so
/// the arm does not snap when the wheel moves out of reach.
pub fn soft_reach(distance: f32, maximum: f32, knee_factor: f32) -> f32 {
    let knee = maximum * knee_factor.clamp(0.0, 1.0);
    let span = maximum - knee;

    if distance <= knee || span <= EPSILON {
        return distance.min(maximum);
    }

    let progress = ((distance - knee) / (2.0 * span)).clamp(0.0, 1.0);
    knee + span * (progress * FRAC_PI_2).sin()
}

/// Finger curl for a grip at the given height, where 0 is the top and 1 the
/// bottom of the wheel.
pub fn finger_curl(height: f32, settings: &GripSettings) -> f32 {
    let blend = smoothstep(settings.curl_start, settings.curl_end, height);
    settings.curl_minimum + (settings.curl_maximum - settings.curl_minimum) * blend
}

pub struct HeuristicGripSolver;

impl HeuristicGripSolver {
    fn elbow_direction(side: HandSide, direction: Vector3<f32>) -> Vector3<f32> {
        let pole = Vector3::new(side.sign() * 0.5, -1.0, 0.0);
        let bend = pole - direction * pole.dot(direction);

        match bend.magnitude2() > EPSILON {
            true => bend.normalize(),
            false => {
                let fallback = Vector3::new(side.sign(), 0.0, 0.0);
                (fallback - direction * fallback.dot(direction)).normalize()
            }
        }
    }
}

impl DriverGripSolver for HeuristicGripSolver {
    fn solve(&self, input: &GripInput, settings: &GripSettings) -> Option<ArmPose> {
        let upper = input.upper_length;
        let lower = input.lower_length;
        let maximum = upper + lower;

        if upper <= EPSILON || lower <= EPSILON {
            return None;
        }

        let required = (input.target - input.shoulder).magnitude();
        let drop = settings.shoulder_drop * smoothstep(settings.shoulder_drop_start * maximum, maximum, required);
        let shoulder = input.shoulder - Vector3::unit_y() * drop;

        let offset = input.target - shoulder;
        let distance = offset.magnitude();

        if distance <= EPSILON {
            return None;
        }

        let direction = offset / distance;
        let reach = soft_reach(distance, maximum, settings.reach_knee).max((upper - lower).abs() + EPSILON);

        let cosine = ((upper * upper + reach * reach - lower * lower) / (2.0 * upper * reach)).clamp(-1.0, 1.0);
        let sine = (1.0 - cosine * cosine).max(0.0).sqrt();
        let bend = Self::elbow_direction(input.side, direction);

        let elbow = shoulder + direction * (upper * cosine) + bend * (upper * sine);
        let wrist = shoulder + direction * reach;

        let radial = input.target - input.wheel_center;
        let radial = radial - input.wheel_axis * radial.dot(input.wheel_axis);
        let radial = match radial.magnitude2() > EPSILON {
            true => radial.normalize(),
            false => input.wheel_up,
        };

        let look_ahead = Matrix3::from_axis_angle(input.wheel_axis, Rad::from(Deg(-input.side.sign() * settings.look_ahead_degrees)));
        let rim_radius = (input.target - input.wheel_center).magnitude();
        let ahead = input.wheel_center + look_ahead * radial * rim_radius;

        let hand_forward = match (ahead - wrist).magnitude2() > EPSILON {
            true => (ahead - wrist).normalize(),
            false => direction,
        };

        let height = (1.0 - radial.dot(input.wheel_up)) * 0.5;

        Some(ArmPose {
            shoulder,
            elbow,
            wrist,
            hand_forward,
            hand_up: radial,
            finger_curl: finger_curl(height, settings),
        })
    }
}
