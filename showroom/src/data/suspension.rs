use cgmath::{Matrix4, Point3};

use super::WheelPosition;

/// Kinematic solution of one suspension, in its own local space.
#[derive(Clone, Debug, PartialEq)]
pub struct Suspension {
    /// Two points on the axis the wheel steers around.
    pub steer_axis: Option<(Point3<f32>, Point3<f32>)>,
    /// Linkage segments for the suspension overlay.
    pub debug_lines: Vec<(Point3<f32>, Point3<f32>)>,
    /// Suspension local space to model space.
    pub transform: Matrix4<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SuspensionsGroup {
    Independent { left: Suspension, right: Suspension },
    /// A solid axle shared by both wheels. Its solution describes the left
    /// side; the right side is mirrored along X.
    Dependent { both: Suspension },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SuspensionsPack {
    pub front: SuspensionsGroup,
    pub rear: SuspensionsGroup,
}

impl SuspensionsPack {
    pub fn suspension(&self, position: WheelPosition) -> &Suspension {
        let group = match position.is_front() {
            true => &self.front,
            false => &self.rear,
        };

        match group {
            SuspensionsGroup::Independent { left, right } => match position.is_left() {
                true => left,
                false => right,
            },
            SuspensionsGroup::Dependent { both } => both,
        }
    }

    /// Transform from the local space of the suspension holding the given
    /// wheel into model space.
    pub fn relative_transform(&self, position: WheelPosition) -> Matrix4<f32> {
        let group = match position.is_front() {
            true => &self.front,
            false => &self.rear,
        };

        match group {
            SuspensionsGroup::Dependent { both } if !position.is_left() => Matrix4::from_nonuniform_scale(-1.0, 1.0, 1.0) * both.transform,
            _ => self.suspension(position).transform,
        }
    }
}
