use std::cell::Cell;
use std::sync::Arc;

use bitflags::bitflags;
use cgmath::{Matrix4, Vector3};
use showroom_util::collision::AABB;

use super::NodeKey;
use crate::loaders::{MeshFlags, MeshGeometry, SourceNode};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DrawableFlags: u8 {
        const VISIBLE = 1 << 0;
        const RENDERABLE = 1 << 1;
        const CASTS_SHADOW = 1 << 2;
        const TRANSPARENT = 1 << 3;
        const REFLECTABLE = 1 << 4;
        const MIRROR = 1 << 5;
    }
}

impl From<MeshFlags> for DrawableFlags {
    fn from(flags: MeshFlags) -> Self {
        let mut drawable_flags = DrawableFlags::REFLECTABLE;
        drawable_flags.set(DrawableFlags::VISIBLE, flags.contains(MeshFlags::VISIBLE));
        drawable_flags.set(DrawableFlags::RENDERABLE, flags.contains(MeshFlags::RENDERABLE));
        drawable_flags.set(DrawableFlags::CASTS_SHADOW, flags.contains(MeshFlags::CASTS_SHADOW));
        drawable_flags.set(DrawableFlags::TRANSPARENT, flags.contains(MeshFlags::TRANSPARENT));
        drawable_flags
    }
}

/// A bone of a skinned drawable. The dummy node driving it is looked up by
/// name on first use and never owned.
#[derive(Debug)]
pub struct BoneBinding {
    pub name: String,
    pub bind_pose: Matrix4<f32>,
    pub(super) target: Cell<Option<NodeKey>>,
}

#[derive(Debug)]
pub struct Drawable {
    pub geometry: Arc<MeshGeometry>,
    pub material_id: usize,
    pub flags: DrawableFlags,
    pub lod_in: f32,
    pub lod_out: f32,
    pub emissive: Option<Vector3<f32>>,
    pub(super) local_bounds: AABB,
    pub(super) bones: Vec<BoneBinding>,
}

impl Drawable {
    fn from_source(source: &SourceNode, geometry: &Arc<MeshGeometry>) -> Self {
        let local_bounds = AABB::from_vertices(geometry.vertices.iter().map(|vertex| vertex.position));
        let bones = geometry
            .bones
            .iter()
            .map(|bone| BoneBinding {
                name: bone.name.clone(),
                bind_pose: bone.bind_pose,
                target: Cell::new(None),
            })
            .collect();

        Self {
            geometry: geometry.clone(),
            material_id: source.material_id.unwrap_or_default(),
            flags: source.flags.into(),
            lod_in: source.lod_in,
            lod_out: source.lod_out,
            emissive: None,
            local_bounds,
            bones,
        }
    }

    pub fn is_drawn(&self) -> bool {
        self.flags.contains(DrawableFlags::VISIBLE | DrawableFlags::RENDERABLE)
    }

    pub fn is_skinned(&self) -> bool {
        !self.bones.is_empty()
    }

    pub fn local_bounds(&self) -> AABB {
        self.local_bounds
    }

    pub fn bones(&self) -> &[BoneBinding] {
        &self.bones
    }

    /// Returns true if the drawable is meant to be seen at the given camera
    /// distance. A zero `lod_out` disables the check.
    pub fn in_lod_range(&self, distance: f32) -> bool {
        self.lod_out <= 0.0 || (self.lod_in <= distance && distance < self.lod_out)
    }
}

#[derive(Debug)]
pub struct SceneNode {
    pub(super) name: String,
    pub(super) parent: Option<NodeKey>,
    pub(super) children: Vec<NodeKey>,
    pub(super) local: Matrix4<f32>,
    pub(super) original_local: Option<Matrix4<f32>>,
    pub(super) enabled: bool,
    pub(super) drawable: Option<Drawable>,
    pub(super) model: Cell<Option<Matrix4<f32>>>,
    pub(super) bounds: Cell<Option<AABB>>,
}

impl SceneNode {
    pub(super) fn from_source(source: &SourceNode, parent: Option<NodeKey>) -> Self {
        Self {
            name: source.name.clone(),
            parent,
            children: Vec::new(),
            local: source.transform,
            original_local: None,
            enabled: source.flags.contains(MeshFlags::ACTIVE),
            drawable: source.geometry.as_ref().map(|geometry| Drawable::from_source(source, geometry)),
            model: Cell::new(None),
            bounds: Cell::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    pub fn local(&self) -> Matrix4<f32> {
        self.local
    }

    /// Local transform the node had before it was first moved.
    pub fn original_local(&self) -> Matrix4<f32> {
        self.original_local.unwrap_or(self.local)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn drawable(&self) -> Option<&Drawable> {
        self.drawable.as_ref()
    }
}
