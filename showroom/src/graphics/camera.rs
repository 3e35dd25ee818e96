use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3};
use derive_new::new;

pub trait Camera {
    fn view_projection_matrices(&self) -> (Matrix4<f32>, Matrix4<f32>);

    fn camera_position(&self) -> Point3<f32>;

    fn distance_to(&self, position: Point3<f32>) -> f32 {
        (position.to_vec() - self.camera_position().to_vec()).magnitude()
    }
}

/// Camera with fixed matrices, used for offscreen previews and thumbnails.
#[derive(new, Clone, Debug)]
pub struct FixedCamera {
    position: Point3<f32>,
    view_matrix: Matrix4<f32>,
    projection_matrix: Matrix4<f32>,
}

impl Camera for FixedCamera {
    fn view_projection_matrices(&self) -> (Matrix4<f32>, Matrix4<f32>) {
        (self.view_matrix, self.projection_matrix)
    }

    fn camera_position(&self) -> Point3<f32> {
        self.position
    }
}
