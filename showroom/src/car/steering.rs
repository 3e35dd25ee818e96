use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3};
#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, print_debug};
use showroom_util::math::{intersect_segment_plane, multiply_matrix4_and_point3, rotation_about_pivot};

use crate::data::{SuspensionsPack, WheelPosition};
use crate::scene::{NodeRole, SceneTree};
use crate::settings::SteeringSettings;

/// Clamps a requested steer angle to the mechanical range and rounds it to
/// the configured step.
pub fn round_steer_angle(angle: f32, settings: &SteeringSettings) -> f32 {
    let angle = angle.clamp(-settings.maximum_angle, settings.maximum_angle);

    match settings.step > 0.0 {
        true => (angle / settings.step).round() * settings.step,
        false => angle,
    }
}

/// Adds the non linear toe-in of a turned wheel. `sign` is +1 for the left
/// and -1 for the right wheel.
pub fn toe_correction(angle: f32, sign: f32, settings: &SteeringSettings) -> f32 {
    let ratio = angle.abs() / settings.toe_reference_degrees;
    angle + sign * settings.toe_correction_degrees * ratio * ratio
}

/// Steering wheel rotation in degrees for a steer angle.
pub fn steering_wheel_degrees(angle: f32, steer_lock: f32, settings: &SteeringSettings) -> f32 {
    steer_lock * (angle / settings.steer_wheel_reference_degrees).clamp(-1.0, 1.0)
}

/// Finds the point on the steer axis that lies in the plane through the
/// wheel center perpendicular to the axis. Returns the pivot and the
/// normalized axis direction.
pub fn solve_steer_pivot(
    axis_from: Point3<f32>,
    axis_to: Point3<f32>,
    wheel_center: Point3<f32>,
    extension: f32,
) -> Option<(Point3<f32>, Vector3<f32>)> {
    let direction = axis_to - axis_from;

    if direction.magnitude2() < f32::EPSILON {
        return None;
    }

    let direction = direction.normalize();
    let pivot = intersect_segment_plane(
        axis_from - direction * extension,
        axis_to + direction * extension,
        wheel_center,
        direction,
    )?;

    Some((pivot, direction))
}

/// Current steer angle and the model space rotations it produces for the
/// front wheels.
pub struct SteeringState {
    angle: f32,
    updates: u64,
    matrices: [Matrix4<f32>; 2],
    reported: [bool; 2],
}

impl Default for SteeringState {
    fn default() -> Self {
        Self {
            angle: 0.0,
            updates: 0,
            matrices: [Matrix4::identity(); 2],
            reported: [false; 2],
        }
    }
}

impl SteeringState {
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Number of times the kinematics were recomputed because the angle
    /// changed.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Stores the rounded angle. Returns false if it did not change.
    pub fn set_angle(&mut self, angle: f32, settings: &SteeringSettings) -> bool {
        let angle = round_steer_angle(angle, settings);

        if angle == self.angle {
            return false;
        }

        self.angle = angle;
        self.updates += 1;
        true
    }

    /// Model space steer rotation of a front wheel, identity for rear wheels.
    pub fn matrix(&self, position: WheelPosition) -> Matrix4<f32> {
        match position.is_front() {
            true => self.matrices[position.index()],
            false => Matrix4::identity(),
        }
    }

    /// Allows failures to be reported again, used after the suspension data
    /// changed.
    pub fn reset_reports(&mut self) {
        self.reported = [false; 2];
    }

    /// Recomputes the steer rotations of both front wheels. `wheel_centers`
    /// are the unsteered model space wheel positions. A wheel whose axis can
    /// not be intersected keeps its previous rotation.
    pub fn solve(&mut self, pack: Option<&SuspensionsPack>, data_to_model: &Matrix4<f32>, wheel_centers: [Option<Point3<f32>>; 2], settings: &SteeringSettings) {
        for position in WheelPosition::FRONT {
            let index = position.index();
            let sign = match position.is_left() {
                true => 1.0,
                false => -1.0,
            };

            let Some(wheel_center) = wheel_centers[index] else {
                continue;
            };

            let Some((axis_from, axis_to)) = pack.and_then(|pack| pack.suspension(position).steer_axis) else {
                self.matrices[index] = Matrix4::identity();
                continue;
            };

            let to_model = *data_to_model * pack.map(|pack| pack.relative_transform(position)).unwrap_or_else(Matrix4::identity);
            let axis_from = multiply_matrix4_and_point3(&to_model, axis_from);
            let axis_to = multiply_matrix4_and_point3(&to_model, axis_to);

            match solve_steer_pivot(axis_from, axis_to, wheel_center, settings.axis_extension) {
                Some((pivot, axis)) => {
                    let angle = toe_correction(self.angle, sign, settings);
                    self.matrices[index] = rotation_about_pivot(pivot, axis, Rad::from(Deg(angle)));
                    self.reported[index] = false;
                }
                None => {
                    if !self.reported[index] {
                        #[cfg(feature = "debug")]
                        print_debug!(
                            "[{}] steer axis of {} does not reach the wheel plane",
                            "error".red(),
                            position.suffix().yellow()
                        );

                        self.reported[index] = true;
                    }
                }
            }
        }
    }
}

/// Rotates both steering wheel variants around their local Z axis.
pub fn apply_steering_wheel(tree: &mut SceneTree, degrees: f32) {
    for role in [NodeRole::SteerWheelHr, NodeRole::SteerWheelLr] {
        if let Some(key) = tree.role(role) {
            if let Some(original) = tree.original_local(key) {
                tree.set_local(key, original * Matrix4::from_angle_z(Deg(degrees)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, InnerSpace, Matrix4, Point3, SquareMatrix, assert_relative_eq};
    use showroom_util::math::{distance_to_line, multiply_matrix4_and_point3};

    use crate::car::steering::{SteeringState, round_steer_angle, solve_steer_pivot, steering_wheel_degrees, toe_correction};
    use crate::data::{Suspension, SuspensionsGroup, SuspensionsPack, WheelPosition};
    use crate::settings::SteeringSettings;

    fn pack_with_axis(from: Point3<f32>, to: Point3<f32>) -> SuspensionsPack {
        let suspension = Suspension {
            steer_axis: Some((from, to)),
            debug_lines: Vec::new(),
            transform: Matrix4::identity(),
        };
        let rear = Suspension {
            steer_axis: None,
            debug_lines: Vec::new(),
            transform: Matrix4::identity(),
        };

        SuspensionsPack {
            front: SuspensionsGroup::Dependent { both: suspension },
            rear: SuspensionsGroup::Dependent { both: rear },
        }
    }

    #[test]
    fn test_round_steer_angle() {
        let settings = SteeringSettings::default();

        assert_relative_eq!(round_steer_angle(12.34, &settings), 12.3, epsilon = 1e-4);
        assert_relative_eq!(round_steer_angle(90.0, &settings), 50.0, epsilon = 1e-4);
        assert_relative_eq!(round_steer_angle(-73.0, &settings), -50.0, epsilon = 1e-4);
    }

    #[test]
    fn test_same_rounded_angle_is_idempotent() {
        let settings = SteeringSettings::default();
        let mut state = SteeringState::default();

        for step in -500..=500 {
            let angle = step as f32 * 0.1;
            let changed = state.set_angle(angle, &settings);
            let updates = state.updates();

            assert!(!state.set_angle(state.angle(), &settings));
            assert!(!state.set_angle(angle, &settings));
            assert_eq!(state.updates(), updates);
            assert!(changed || angle == 0.0);
        }
    }

    #[test]
    fn test_toe_correction() {
        let settings = SteeringSettings::default();

        assert_relative_eq!(toe_correction(0.0, 1.0, &settings), 0.0);
        assert_relative_eq!(toe_correction(30.0, 1.0, &settings), 31.5, epsilon = 1e-5);
        assert_relative_eq!(toe_correction(30.0, -1.0, &settings), 28.5, epsilon = 1e-5);
        assert_relative_eq!(toe_correction(-15.0, 1.0, &settings), -14.625, epsilon = 1e-5);
    }

    #[test]
    fn test_steering_wheel_degrees_clamped() {
        let settings = SteeringSettings::default();

        assert_relative_eq!(steering_wheel_degrees(15.0, 540.0, &settings), 270.0, epsilon = 1e-4);
        assert_relative_eq!(steering_wheel_degrees(45.0, 540.0, &settings), 540.0, epsilon = 1e-4);
        assert_relative_eq!(steering_wheel_degrees(-45.0, 540.0, &settings), -540.0, epsilon = 1e-4);
    }

    #[test]
    fn test_pivot_lies_on_axis() {
        let from = Point3::new(0.7, 0.1, 1.2);
        let to = Point3::new(0.65, 0.5, 1.25);
        let wheel = Point3::new(0.8, 0.3, 1.3);

        let (pivot, axis) = solve_steer_pivot(from, to, wheel, 10.0).unwrap();

        assert_relative_eq!(distance_to_line(pivot, from, to), 0.0, epsilon = 1e-5);
        assert_relative_eq!(axis.dot(wheel - pivot), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_pivot_outside_extended_axis() {
        let from = Point3::new(0.0, 0.0, 0.0);
        let to = Point3::new(0.0, 1.0, 0.0);

        assert!(solve_steer_pivot(from, to, Point3::new(0.0, 20.0, 0.0), 10.0).is_none());
        assert!(solve_steer_pivot(from, from, Point3::new(0.0, 0.5, 0.0), 10.0).is_none());
    }

    #[test]
    fn test_steer_matrix_reproduces_angle() {
        let settings = SteeringSettings {
            toe_correction_degrees: 0.0,
            ..SteeringSettings::default()
        };
        let from = Point3::new(0.7, 0.0, 1.3);
        let to = Point3::new(0.7, 1.0, 1.3);
        let wheel = Point3::new(0.9, 0.3, 1.3);
        let pack = pack_with_axis(from, to);

        let mut state = SteeringState::default();
        state.set_angle(20.0, &settings);
        state.solve(Some(&pack), &Matrix4::identity(), [Some(wheel), Some(wheel)], &settings);

        let steered = multiply_matrix4_and_point3(&state.matrix(WheelPosition::LeftFront), wheel);
        let pivot = Point3::new(0.7, 0.3, 1.3);
        let before = (wheel - pivot).normalize();
        let after = (steered - pivot).normalize();

        assert_relative_eq!(before.dot(after), Deg(20.0_f32).0.to_radians().cos(), epsilon = 1e-5);
        assert_relative_eq!(steered.y, wheel.y, epsilon = 1e-5);
        assert_relative_eq!((steered - pivot).magnitude(), 0.2, epsilon = 1e-5);
        assert_relative_eq!(state.matrix(WheelPosition::LeftRear), Matrix4::identity());
    }

    #[test]
    fn test_failed_pivot_keeps_previous_matrix() {
        let settings = SteeringSettings::default();
        let pack = pack_with_axis(Point3::new(0.7, 0.0, 1.3), Point3::new(0.7, 1.0, 1.3));
        let wheel = Point3::new(0.9, 0.3, 1.3);

        let mut state = SteeringState::default();
        state.set_angle(10.0, &settings);
        state.solve(Some(&pack), &Matrix4::identity(), [Some(wheel), None], &settings);
        let previous = state.matrix(WheelPosition::LeftFront);

        state.set_angle(20.0, &settings);
        state.solve(Some(&pack), &Matrix4::identity(), [Some(Point3::new(0.9, 50.0, 1.3)), None], &settings);

        assert_relative_eq!(state.matrix(WheelPosition::LeftFront), previous);
        assert!(previous != Matrix4::identity());
    }
}
