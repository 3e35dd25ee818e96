mod animation;
mod error;
mod icon;
mod model;
mod texture;

pub use self::animation::{Animator, AnimatorFactory};
pub use self::error::LoadError;
pub use self::icon::IconCache;
pub use self::model::{
    BoneData, HierarchyData, MaterialData, MeshFlags, MeshGeometry, MeshSource, MeshVertex, ModelData, NodeClass, SourceNode,
};
pub use self::texture::{TextureLoader, TextureRequest, decode_texture};
