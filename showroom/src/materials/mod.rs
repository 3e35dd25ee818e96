mod textures;

use std::sync::Arc;

use hashbrown::HashMap;
#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, Timer, print_debug};

pub use self::textures::{TextureOverride, TexturesProvider};
use crate::graphics::Texture;
use crate::loaders::{ModelData, TextureLoader};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaterialKind {
    Regular,
    Mirror,
}

/// Renderable material of a node. Textures are referenced by name and
/// resolved through the [`TexturesProvider`] every time they are drawn.
#[derive(Clone, Debug)]
pub struct MaterialInstance {
    pub name: String,
    pub textures: Vec<String>,
    pub transparent: bool,
    pub kind: MaterialKind,
}

/// Materials and embedded textures of one level of detail.
pub struct MaterialsProvider {
    materials: Vec<MaterialInstance>,
    mirror: MaterialInstance,
    base_textures: HashMap<String, Arc<Texture>>,
}

impl MaterialsProvider {
    pub fn new(model: &ModelData, texture_loader: &TextureLoader) -> Self {
        #[cfg(feature = "debug")]
        let timer = Timer::new_dynamic(format!("create {} materials", model.materials.len().to_string().magenta()));

        let materials = model
            .materials
            .iter()
            .map(|material| MaterialInstance {
                name: material.name.clone(),
                textures: material.textures.clone(),
                transparent: material.alpha_blend,
                kind: MaterialKind::Regular,
            })
            .collect();

        let mut base_textures = HashMap::new();

        for (name, bytes) in &model.textures {
            match texture_loader.decode(name, bytes) {
                Ok(texture) => {
                    base_textures.insert(name.to_ascii_lowercase(), texture);
                }
                Err(_error) => {
                    #[cfg(feature = "debug")]
                    print_debug!("[{}] embedded texture {}: {}", "error".red(), name.magenta(), _error);
                }
            }
        }

        #[cfg(feature = "debug")]
        timer.stop();

        Self {
            materials,
            mirror: MaterialInstance {
                name: "mirror".to_owned(),
                textures: Vec::new(),
                transparent: false,
                kind: MaterialKind::Mirror,
            },
            base_textures,
        }
    }

    pub fn material(&self, material_id: usize) -> Option<&MaterialInstance> {
        self.materials.get(material_id)
    }

    pub fn mirror_material(&self) -> &MaterialInstance {
        &self.mirror
    }

    pub fn base_texture(&self, name: &str) -> Option<Arc<Texture>> {
        self.base_textures.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
