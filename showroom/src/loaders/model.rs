//! Node tree handed over by the mesh parser.

use std::path::Path;
use std::sync::Arc;

use bitflags::bitflags;
use cgmath::{Matrix4, Point3, SquareMatrix, Vector2, Vector3};
use hashbrown::HashMap;

use super::LoadError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeClass {
    Group,
    Mesh,
    SkinnedMesh,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MeshFlags: u8 {
        const ACTIVE = 1 << 0;
        const VISIBLE = 1 << 1;
        const RENDERABLE = 1 << 2;
        const CASTS_SHADOW = 1 << 3;
        const TRANSPARENT = 1 << 4;
    }
}

impl Default for MeshFlags {
    fn default() -> Self {
        Self::ACTIVE | Self::VISIBLE | Self::RENDERABLE | Self::CASTS_SHADOW
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MeshVertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub texture_coordinates: Vector2<f32>,
    pub bone_weights: [f32; 4],
    pub bone_indices: [u16; 4],
}

impl MeshVertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, texture_coordinates: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            texture_coordinates,
            bone_weights: [0.0; 4],
            bone_indices: [0; 4],
        }
    }
}

#[derive(Clone, Debug)]
pub struct BoneData {
    /// Name of the dummy node driving this bone.
    pub name: String,
    pub bind_pose: Matrix4<f32>,
}

#[derive(Clone, Debug, Default)]
pub struct MeshGeometry {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub bones: Vec<BoneData>,
}

#[derive(Clone, Debug)]
pub struct SourceNode {
    pub name: String,
    pub class: NodeClass,
    pub transform: Matrix4<f32>,
    pub material_id: Option<usize>,
    pub flags: MeshFlags,
    pub lod_in: f32,
    pub lod_out: f32,
    pub geometry: Option<Arc<MeshGeometry>>,
    pub children: Vec<SourceNode>,
}

impl SourceNode {
    pub fn group(name: impl Into<String>, transform: Matrix4<f32>) -> Self {
        Self {
            name: name.into(),
            class: NodeClass::Group,
            transform,
            material_id: None,
            flags: MeshFlags::default(),
            lod_in: 0.0,
            lod_out: 0.0,
            geometry: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, transform: Matrix4<f32>, material_id: usize, geometry: MeshGeometry) -> Self {
        let class = match geometry.bones.is_empty() {
            true => NodeClass::Mesh,
            false => NodeClass::SkinnedMesh,
        };

        Self {
            name: name.into(),
            class,
            transform,
            material_id: Some(material_id),
            flags: MeshFlags::default(),
            lod_in: 0.0,
            lod_out: 0.0,
            geometry: Some(Arc::new(geometry)),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SourceNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_flags(mut self, flags: MeshFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Depth first search for a node by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&SourceNode> {
        if self.name.eq_ignore_ascii_case(name) {
            return Some(self);
        }

        self.children.iter().find_map(|child| child.find(name))
    }
}

#[derive(Clone, Debug, Default)]
pub struct MaterialData {
    pub name: String,
    pub shader: String,
    /// Texture names in slot order.
    pub textures: Vec<String>,
    pub alpha_blend: bool,
}

/// A parsed model: its node tree, material table and embedded textures.
#[derive(Clone, Debug)]
pub struct ModelData {
    pub root: SourceNode,
    pub materials: Vec<MaterialData>,
    /// Encoded texture files keyed by their name.
    pub textures: HashMap<String, Arc<Vec<u8>>>,
}

impl ModelData {
    pub fn new(root: SourceNode) -> Self {
        Self {
            root,
            materials: Vec::new(),
            textures: HashMap::new(),
        }
    }
}

/// Local transforms by node name, used to pose a rig.
#[derive(Clone, Debug, Default)]
pub struct HierarchyData {
    pub transforms: HashMap<String, Matrix4<f32>>,
}

impl HierarchyData {
    pub fn transform(&self, name: &str) -> Matrix4<f32> {
        self.transforms.get(name).copied().unwrap_or_else(Matrix4::identity)
    }
}

/// Parser of the binary model format.
pub trait MeshSource: Send + Sync {
    fn load_model(&self, path: &Path) -> Result<Arc<ModelData>, LoadError>;

    fn load_hierarchy(&self, path: &Path) -> Result<HierarchyData, LoadError>;
}
