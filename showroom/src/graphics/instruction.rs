use std::sync::Arc;

use cgmath::{Matrix4, Point3, Vector3};
use derive_new::new;

use super::{Color, DrawMode, Texture};
use crate::scene::NodeKey;

#[derive(Clone, Debug)]
pub struct ModelInstruction {
    pub model_matrix: Matrix4<f32>,
    pub node: NodeKey,
    pub material_id: usize,
    /// One entry per texture slot of the material. [`None`] is drawn with an
    /// empty placeholder.
    pub textures: Vec<Option<Arc<Texture>>>,
    pub bone_matrices: Vec<Matrix4<f32>>,
    pub emissive: Option<Vector3<f32>>,
    pub distance: f32,
    pub transparent: bool,
    pub mirror: bool,
}

#[derive(Clone, Debug)]
pub struct ShadowInstruction {
    pub world: Matrix4<f32>,
    pub texture: Option<Arc<Texture>>,
    pub opacity: f32,
}

#[derive(new, Copy, Clone, Debug, PartialEq)]
pub struct DebugLineInstruction {
    pub from: Point3<f32>,
    pub to: Point3<f32>,
    pub color: Color,
}

/// Everything a car emits for one pass, consumed by the GPU layer.
#[derive(Default)]
pub struct CarInstructions {
    pub mode: Option<DrawMode>,
    pub models: Vec<ModelInstruction>,
    pub shadows: Vec<ShadowInstruction>,
    pub debug_lines: Vec<DebugLineInstruction>,
}

impl CarInstructions {
    pub fn clear(&mut self) {
        self.mode = None;
        self.models.clear();
        self.shadows.clear();
        self.debug_lines.clear();
    }
}
