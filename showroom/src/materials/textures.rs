use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashMap;
#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, print_debug};
use showroom_util::container::ResourceState;

use super::MaterialsProvider;
use crate::graphics::Texture;
use crate::loaders::{LoadError, TextureLoader, TextureRequest};

/// Replacement for a texture pushed by a paint preview.
pub enum TextureOverride {
    /// Encoded image file.
    Bytes(Vec<u8>),
    /// Already decoded texture.
    View(Arc<Texture>),
}

/// Skin texture slot. `Ready(None)` means the skin does not replace the
/// texture.
type SkinSlot = ResourceState<Option<Arc<Texture>>, LoadError>;

/// Resolves texture names for the whole car. Procedural overrides shadow the
/// selected skin, which shadows the textures embedded in the current level of
/// detail. The embedded textures are never modified.
pub struct TexturesProvider {
    texture_loader: Arc<TextureLoader>,
    owner: u64,
    async_loading: bool,
    override_directory: Option<PathBuf>,
    generation: u64,
    skin: HashMap<String, SkinSlot>,
    procedural: HashMap<String, Arc<Texture>>,
}

impl TexturesProvider {
    pub fn new(texture_loader: Arc<TextureLoader>, async_loading: bool) -> Self {
        Self {
            owner: texture_loader.register_owner(),
            texture_loader,
            async_loading,
            override_directory: None,
            generation: 0,
            skin: HashMap::new(),
            procedural: HashMap::new(),
        }
    }

    pub fn override_directory(&self) -> Option<&Path> {
        self.override_directory.as_deref()
    }

    /// Points the skin layer at another directory. Returns false if nothing
    /// changed.
    pub fn set_override_directory(&mut self, directory: Option<PathBuf>) -> bool {
        if self.override_directory == directory {
            return false;
        }

        #[cfg(feature = "debug")]
        match &directory {
            Some(directory) => print_debug!("texture overrides from {}", directory.display().magenta()),
            None => print_debug!("texture overrides {}", "disabled".yellow()),
        }

        self.override_directory = directory;
        self.reload_overrides();
        true
    }

    /// Forgets every skin texture so they are read from disk again.
    pub fn reload_overrides(&mut self) {
        self.texture_loader.cancel_generation(self.owner, self.generation);
        self.generation += 1;
        self.skin.clear();
    }

    /// Resolves a texture by name. [`None`] is drawn as an empty placeholder,
    /// which also covers skin textures that are still loading.
    pub fn resolve(&mut self, name: &str, base: Option<&MaterialsProvider>) -> Option<Arc<Texture>> {
        let key = name.to_ascii_lowercase();

        if let Some(texture) = self.procedural.get(&key) {
            return Some(texture.clone());
        }

        if let Some(directory) = &self.override_directory {
            let slot = self.skin.entry(key.clone()).or_default();

            if slot.is_unloaded() {
                let path = directory.join(name);

                if !path.is_file() {
                    slot.finish(Ok(None));
                } else if self.async_loading {
                    slot.begin_loading();
                    self.texture_loader.request_load(
                        TextureRequest {
                            owner: self.owner,
                            generation: self.generation,
                            name: key.clone(),
                        },
                        path,
                    );
                } else {
                    slot.finish(self.texture_loader.load_file(&path).map(Some));
                }
            }

            match slot {
                ResourceState::Loading => return None,
                ResourceState::Ready(Some(texture)) => return Some(texture.clone()),
                _ => {}
            }
        }

        base.and_then(|base| base.base_texture(name))
    }

    /// Moves finished background loads into their slots. Returns the number
    /// of textures that changed.
    pub fn poll(&mut self) -> usize {
        let mut changed = 0;

        for (request, result) in self.texture_loader.take_completed(self.owner) {
            if request.generation != self.generation {
                continue;
            }

            let Some(slot) = self.skin.get_mut(&request.name) else {
                continue;
            };

            if let Err(_error) = &result {
                #[cfg(feature = "debug")]
                print_debug!("[{}] skin texture {}: {}", "error".red(), request.name.magenta(), _error);
            }

            slot.finish(result.map(Some));
            changed += 1;
        }

        changed
    }

    pub fn has_pending(&self) -> bool {
        self.skin.values().any(ResourceState::is_loading)
    }

    pub fn override_texture(&mut self, name: &str, texture: Arc<Texture>) {
        self.procedural.insert(name.to_ascii_lowercase(), texture);
    }

    pub fn clear_procedural_overrides(&mut self) {
        self.procedural.clear();
    }
}
