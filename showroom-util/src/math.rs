//! Implements some commonly used math functions.

use cgmath::{EuclideanSpace, InnerSpace, Matrix, Matrix3, Matrix4, Point3, Quaternion, Rad, SquareMatrix, Vector3};

const EPSILON: f32 = 1e-6;

/// Multiplies a 4x4 matrix with a 3 component point, treating the point as a
/// position in 3D space.
pub fn multiply_matrix4_and_point3(matrix: &Matrix4<f32>, point: Point3<f32>) -> Point3<f32> {
    let adjusted = matrix * point.to_homogeneous();
    Point3::from_homogeneous(adjusted)
}

/// Multiplies a 4x4 matrix with a direction. Translation is ignored.
pub fn multiply_matrix4_and_vector3(matrix: &Matrix4<f32>, vector: Vector3<f32>) -> Vector3<f32> {
    (matrix * vector.extend(0.0)).truncate()
}

/// Returns the translation part of an affine matrix.
pub fn matrix_translation(matrix: &Matrix4<f32>) -> Point3<f32> {
    Point3::from_vec(matrix.w.truncate())
}

/// Intersects the segment `from..to` with the plane through `plane_point`
/// with the normal `plane_normal`. Returns [`None`] if the segment is
/// parallel to the plane or does not reach it.
pub fn intersect_segment_plane(
    from: Point3<f32>,
    to: Point3<f32>,
    plane_point: Point3<f32>,
    plane_normal: Vector3<f32>,
) -> Option<Point3<f32>> {
    let direction = to - from;
    let denominator = plane_normal.dot(direction);

    if denominator.abs() < EPSILON {
        return None;
    }

    let t = plane_normal.dot(plane_point - from) / denominator;

    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    Some(from + direction * t)
}

/// Shortest distance between a point and the infinite line through `line_0`
/// and `line_1`.
pub fn distance_to_line(point: Point3<f32>, line_0: Point3<f32>, line_1: Point3<f32>) -> f32 {
    let direction = line_1 - line_0;

    if direction.magnitude2() < EPSILON * EPSILON {
        return (point - line_0).magnitude();
    }

    let direction = direction.normalize();
    let offset = point - line_0;
    (offset - direction * offset.dot(direction)).magnitude()
}

/// Rotation around an arbitrary axis going through `pivot`. The axis has to be
/// normalized.
pub fn rotation_about_pivot(pivot: Point3<f32>, axis: Vector3<f32>, angle: Rad<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(pivot.to_vec()) * Matrix4::from_axis_angle(axis, angle) * Matrix4::from_translation(-pivot.to_vec())
}

/// Translation, rotation and scale of an affine matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposition {
    /// Translation part.
    pub translation: Vector3<f32>,
    /// Pure rotation part.
    pub rotation: Quaternion<f32>,
    /// Per axis scale. A mirrored matrix has a negative x scale.
    pub scale: Vector3<f32>,
}

impl Decomposition {
    /// Splits an affine matrix into its parts. Shear is not supported.
    pub fn from_matrix(matrix: &Matrix4<f32>) -> Self {
        let x_axis = matrix.x.truncate();
        let y_axis = matrix.y.truncate();
        let z_axis = matrix.z.truncate();

        let mut scale = Vector3::new(x_axis.magnitude(), y_axis.magnitude(), z_axis.magnitude());

        if Matrix3::from_cols(x_axis, y_axis, z_axis).determinant() < 0.0 {
            scale.x = -scale.x;
        }

        let safe = |value: f32| if value.abs() < EPSILON { 1.0 } else { value };
        let rotation_matrix = Matrix3::from_cols(x_axis / safe(scale.x), y_axis / safe(scale.y), z_axis / safe(scale.z));

        Self {
            translation: matrix.w.truncate(),
            rotation: Quaternion::from(rotation_matrix).normalize(),
            scale,
        }
    }

    /// Composes the parts back into `translation * rotation * scale`.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Rotation whose local Z axis points along `forward` and whose local Y axis
/// is as close to `up` as possible. Returns [`None`] for degenerate input.
pub fn look_rotation(forward: Vector3<f32>, up: Vector3<f32>) -> Option<Matrix3<f32>> {
    if forward.magnitude2() < EPSILON * EPSILON {
        return None;
    }

    let z_axis = forward.normalize();
    let x_axis = up.cross(z_axis);

    if x_axis.magnitude2() < EPSILON * EPSILON {
        return None;
    }

    let x_axis = x_axis.normalize();
    let y_axis = z_axis.cross(x_axis);

    Some(Matrix3::from_cols(x_axis, y_axis, z_axis))
}

/// Hermite interpolation between `edge_0` and `edge_1`, clamped to `0..1`.
pub fn smoothstep(edge_0: f32, edge_1: f32, value: f32) -> f32 {
    if (edge_1 - edge_0).abs() < EPSILON {
        return if value < edge_0 { 0.0 } else { 1.0 };
    }

    let t = ((value - edge_0) / (edge_1 - edge_0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Heading of a matrix around the Y axis, measured from +Z towards +X.
pub fn yaw_of_matrix(matrix: &Matrix4<f32>) -> Rad<f32> {
    let forward = matrix.z.truncate();
    Rad(forward.x.atan2(forward.z))
}

/// Inverts an affine matrix, falling back to the identity for singular ones.
pub fn invert_or_identity(matrix: &Matrix4<f32>) -> Matrix4<f32> {
    matrix.invert().unwrap_or_else(Matrix4::identity)
}

/// Returns the transposed rotation of a pure rotation matrix.
pub fn inverse_rotation(rotation: &Matrix3<f32>) -> Matrix3<f32> {
    rotation.transpose()
}
