use cgmath::{Deg, EuclideanSpace, Matrix4, Point3};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WheelPosition {
    LeftFront,
    RightFront,
    LeftRear,
    RightRear,
}

impl WheelPosition {
    pub const ALL: [WheelPosition; 4] = [Self::LeftFront, Self::RightFront, Self::LeftRear, Self::RightRear];
    pub const FRONT: [WheelPosition; 2] = [Self::LeftFront, Self::RightFront];

    pub fn index(self) -> usize {
        match self {
            Self::LeftFront => 0,
            Self::RightFront => 1,
            Self::LeftRear => 2,
            Self::RightRear => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn is_front(self) -> bool {
        matches!(self, Self::LeftFront | Self::RightFront)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Self::LeftFront | Self::LeftRear)
    }

    /// Suffix used in node names, for example `LF` in `WHEEL_LF`.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::LeftFront => "LF",
            Self::RightFront => "RF",
            Self::LeftRear => "LR",
            Self::RightRear => "RR",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|position| position.suffix().eq_ignore_ascii_case(suffix))
    }
}

/// Geometry of one wheel as described by the tyre and suspension data.
#[derive(Clone, Debug, PartialEq)]
pub struct WheelDescriptor {
    pub position: WheelPosition,
    pub radius: f32,
    pub rim_radius: f32,
    pub width: f32,
    pub center_at_ride_height: Point3<f32>,
    pub center_at_suspension_travel: Point3<f32>,
    /// Static camber in degrees, negative tilts the top inwards.
    pub camber: f32,
    /// Static toe in degrees, positive points the front inwards.
    pub toe: f32,
}

impl WheelDescriptor {
    pub fn is_left(&self) -> bool {
        self.position.is_left()
    }

    pub fn is_front(&self) -> bool {
        self.position.is_front()
    }

    pub fn center(&self, suspension_travel: bool) -> Point3<f32> {
        match suspension_travel {
            true => self.center_at_suspension_travel,
            false => self.center_at_ride_height,
        }
    }

    /// Model space placement of the wheel with static camber and toe, but
    /// without rolling or steering.
    pub fn wheel_matrix(&self, suspension_travel: bool) -> Matrix4<f32> {
        let sign = match self.is_left() {
            true => 1.0,
            false => -1.0,
        };

        Matrix4::from_translation(self.center(suspension_travel).to_vec())
            * Matrix4::from_angle_y(Deg(self.toe * sign))
            * Matrix4::from_angle_z(Deg(self.camber * sign))
    }
}

/// Per axle suspension travel, from 0 (fully extended) to 1 (compressed).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SuspensionModifiers {
    pub front_travel: f32,
    pub rear_travel: f32,
}
