use cgmath::{Array, EuclideanSpace, Matrix4, Point3, Vector3};

use crate::math::multiply_matrix4_and_point3;

/// An axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    min: Point3<f32>,
    max: Point3<f32>,
}

impl AABB {
    /// Create a new AABB from two points.
    pub fn new(point_0: Point3<f32>, point_1: Point3<f32>) -> Self {
        AABB {
            min: point_0.zip(point_1, f32::min),
            max: point_0.zip(point_1, f32::max),
        }
    }

    /// Calculates the axis aligned bounding box from a list of vertices. An
    /// empty list results in an [`uninitialized`](Self::uninitialized) box.
    pub fn from_vertices<T>(vertex_positions: T) -> Self
    where
        T: IntoIterator<Item = Point3<f32>>,
    {
        let (min, max) = vertex_positions.into_iter().fold(
            (Point3::from_value(f32::MAX), Point3::from_value(-f32::MAX)),
            |(min, max), position| (min.zip(position, f32::min), max.zip(position, f32::max)),
        );

        Self { min, max }
    }

    /// Create an AABB from a center point and half-extents.
    pub fn from_center_and_size(center: Point3<f32>, half_size: Vector3<f32>) -> Self {
        AABB {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Creates a box without a meaningful value. Extending it with any valid
    /// box or point yields exactly that box or point.
    pub fn uninitialized() -> Self {
        Self {
            min: Point3::from_value(f32::MAX),
            max: Point3::from_value(-f32::MAX),
        }
    }

    /// Returns false for [`uninitialized`](Self::uninitialized) boxes and
    /// boxes built from no vertices.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Returns true if the box covers a non-zero volume on at least one axis.
    pub fn has_extent(&self) -> bool {
        self.is_valid() && (self.max.x > self.min.x || self.max.y > self.min.y || self.max.z > self.min.z)
    }

    /// Get the min point of the AABB.
    pub fn min(&self) -> Point3<f32> {
        self.min
    }

    /// Get the max point of the AABB.
    pub fn max(&self) -> Point3<f32> {
        self.max
    }

    /// Get the center of the AABB.
    pub fn center(&self) -> Point3<f32> {
        (self.min + self.max.to_vec()) * 0.5
    }

    /// Get the size (dimensions) of the AABB.
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Get the half-extents of the AABB.
    pub fn half_size(&self) -> Vector3<f32> {
        self.size() * 0.5
    }

    /// Check if a point is inside the AABB.
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Expand the AABB to include a point.
    pub fn expand(&mut self, point: Point3<f32>) {
        self.min = self.min.zip(point, f32::min);
        self.max = self.max.zip(point, f32::max);
    }

    /// Extends the current AABB with another AABB. Invalid boxes are ignored.
    pub fn extend(&mut self, other: &Self) {
        if !other.is_valid() {
            return;
        }

        self.min = self.min.zip(other.min, f32::min);
        self.max = self.max.zip(other.max, f32::max);
    }

    /// Returns the box enclosing all eight corners of this box after they
    /// were transformed by the given matrix.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        if !self.is_valid() {
            return *self;
        }

        let (min, max) = (self.min, self.max);
        let corners = [
            Point3::new(min.x, min.y, min.z),
            Point3::new(min.x, min.y, max.z),
            Point3::new(min.x, max.y, min.z),
            Point3::new(min.x, max.y, max.z),
            Point3::new(max.x, min.y, min.z),
            Point3::new(max.x, min.y, max.z),
            Point3::new(max.x, max.y, min.z),
            Point3::new(max.x, max.y, max.z),
        ];

        Self::from_vertices(corners.map(|corner| multiply_matrix4_and_point3(matrix, corner)))
    }
}
