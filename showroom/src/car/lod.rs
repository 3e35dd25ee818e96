use std::path::Path;
use std::sync::Arc;

#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, Timer, print_debug};
use showroom_util::collision::AABB;
use showroom_util::container::ResourceState;

use crate::data::LodDescriptor;
use crate::loaders::{LoadError, MeshSource, ModelData, TextureLoader};
use crate::materials::MaterialsProvider;
use crate::scene::{NodeKey, SceneTree};

/// Models grafted into a tree at runtime. Their keys are only valid for the
/// tree they were grafted into.
#[derive(Default)]
pub struct Attachments {
    pub driver: Option<NodeKey>,
    pub crew: Vec<NodeKey>,
}

/// A scene tree together with what was grafted into it.
pub struct LodScene {
    pub tree: SceneTree,
    pub attachments: Attachments,
}

impl LodScene {
    pub fn new(tree: SceneTree) -> Self {
        Self {
            tree,
            attachments: Attachments::default(),
        }
    }

    fn is_attachment(&self, key: NodeKey) -> bool {
        self.attachments.driver == Some(key) || self.attachments.crew.contains(&key)
    }

    /// Model space bounds of the car itself, ignoring grafted models.
    pub fn body_bounds(&self) -> AABB {
        let root = self.tree.root();
        let mut bounds = AABB::uninitialized();

        let Some(node) = self.tree.get(root) else {
            return bounds;
        };

        if let Some(drawable) = node.drawable().filter(|_| node.is_enabled()) {
            bounds.extend(&drawable.local_bounds().transformed(&self.tree.model_matrix(root)));
        }

        for child in node.children().iter().filter(|child| !self.is_attachment(**child)) {
            bounds.extend(&self.tree.bounding_box(*child));
        }

        bounds
    }
}

struct LodEntry {
    descriptor: LodDescriptor,
    model: ResourceState<Arc<ModelData>, LoadError>,
    parked: Option<LodScene>,
    materials: Option<MaterialsProvider>,
}

impl LodEntry {
    fn new(descriptor: LodDescriptor) -> Self {
        Self {
            descriptor,
            model: ResourceState::Unloaded,
            parked: None,
            materials: None,
        }
    }
}

/// Levels of detail of one car. Entry zero always holds the model the car
/// was created from. Other models are read on first use and their trees are
/// kept once built.
pub struct LodTable {
    entries: Vec<LodEntry>,
    current: usize,
}

fn build_entries(descriptors: Vec<LodDescriptor>, initial: Arc<ModelData>) -> Vec<LodEntry> {
    let mut entries: Vec<LodEntry> = descriptors.into_iter().map(LodEntry::new).collect();

    if entries.is_empty() {
        entries.push(LodEntry::new(LodDescriptor::new(String::new(), 0.0, 0.0)));
    }

    entries[0].model = ResourceState::Ready(initial);
    entries
}

impl LodTable {
    pub fn new(descriptors: Vec<LodDescriptor>, initial: Arc<ModelData>) -> Self {
        Self {
            entries: build_entries(descriptors, initial),
            current: 0,
        }
    }

    /// Number of levels of detail, never zero.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Returns the model of a level of detail, reading it on first use. A
    /// failed read is not retried until the table is reloaded.
    pub fn load(&mut self, index: usize, mesh_source: &dyn MeshSource, car_directory: &Path) -> Option<Result<Arc<ModelData>, LoadError>> {
        let entry = self.entries.get_mut(index)?;

        if entry.model.is_unloaded() {
            let path = car_directory.join(&entry.descriptor.file);

            #[cfg(feature = "debug")]
            let timer = Timer::new_dynamic(format!("load level of detail {}", path.display().magenta()));

            let result = mesh_source.load_model(&path);

            #[cfg(feature = "debug")]
            match &result {
                Ok(_) => timer.stop(),
                Err(error) => {
                    print_debug!("[{}] {}", "error".red(), error);
                    drop(timer);
                }
            }

            entry.model.finish(result);
        }

        match &entry.model {
            ResourceState::Ready(model) => Some(Ok(model.clone())),
            ResourceState::Failed(error) => Some(Err(error.clone())),
            _ => None,
        }
    }

    /// Takes the tree that was built for a level of detail before.
    pub fn take_parked(&mut self, index: usize) -> Option<LodScene> {
        self.entries.get_mut(index).and_then(|entry| entry.parked.take())
    }

    /// Stores the scene of the current level of detail and makes `index`
    /// current.
    pub fn switch(&mut self, index: usize, previous: LodScene) {
        if let Some(entry) = self.entries.get_mut(self.current) {
            entry.parked = Some(previous);
        }

        self.current = index;
    }

    /// Scenes of the levels of detail that are not current.
    pub fn parked_mut(&mut self) -> impl Iterator<Item = &mut LodScene> {
        self.entries.iter_mut().filter_map(|entry| entry.parked.as_mut())
    }

    /// Materials of the current level of detail, created on first use.
    pub fn materials(&mut self, texture_loader: &TextureLoader) -> Option<&MaterialsProvider> {
        let entry = self.entries.get_mut(self.current)?;

        if entry.materials.is_none() {
            if let Some(model) = entry.model.ready() {
                entry.materials = Some(MaterialsProvider::new(model, texture_loader));
            }
        }

        entry.materials.as_ref()
    }

    /// Replaces the descriptors after the level of detail list changed. The
    /// initial model and its tree are kept. Returns the index the car should
    /// switch to if its current tree belongs to a level of detail that has to
    /// be read again.
    pub fn reload(&mut self, descriptors: Vec<LodDescriptor>) -> Option<usize> {
        let first = self.entries.first_mut()?;
        let initial = first.model.ready().cloned()?;
        let parked = first.parked.take();
        let materials = first.materials.take();

        let mut entries = build_entries(descriptors, initial);
        entries[0].parked = parked;
        entries[0].materials = materials;
        self.entries = entries;

        if self.current == 0 {
            return None;
        }

        let target = self.current.min(self.entries.len() - 1);
        self.current = target;
        Some(target)
    }

    /// Makes `index` current without parking anything, used when the
    /// previous tree is discarded.
    pub fn force_current(&mut self, index: usize) {
        self.current = index.min(self.entries.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use crate::car::fixtures::{FixtureMeshSource, fixture_model};
    use crate::car::lod::{LodScene, LodTable};
    use crate::data::LodDescriptor;
    use crate::scene::SceneTree;

    fn descriptors() -> Vec<LodDescriptor> {
        vec![
            LodDescriptor::new(String::new(), 0.0, 15.0),
            LodDescriptor::new("car_lod_b.kn5".to_owned(), 15.0, 60.0),
            LodDescriptor::new("missing.kn5".to_owned(), 60.0, 1000.0),
        ]
    }

    #[test]
    fn test_empty_descriptors_keep_initial_model() {
        let table = LodTable::new(Vec::new(), Arc::new(fixture_model(true)));

        assert_eq!(table.count(), 1);
        assert_eq!(table.current(), 0);
    }

    #[test]
    fn test_models_are_loaded_once() {
        let meshes = FixtureMeshSource::default();
        let mut table = LodTable::new(descriptors(), Arc::new(fixture_model(true)));

        assert!(table.load(0, &meshes, Path::new("car")).unwrap().is_ok());
        assert_eq!(meshes.loads(), 0);

        assert!(table.load(1, &meshes, Path::new("car")).unwrap().is_ok());
        assert!(table.load(1, &meshes, Path::new("car")).unwrap().is_ok());
        assert_eq!(meshes.loads(), 1);

        assert!(table.load(2, &meshes, Path::new("car")).unwrap().is_err());
        assert!(table.load(2, &meshes, Path::new("car")).unwrap().is_err());
        assert_eq!(meshes.loads(), 2);

        assert!(table.load(3, &meshes, Path::new("car")).is_none());
    }

    #[test]
    fn test_switch_parks_previous_tree() {
        let model = Arc::new(fixture_model(true));
        let mut table = LodTable::new(descriptors(), model.clone());
        let scene = LodScene::new(SceneTree::from_source(&model.root));

        table.switch(1, scene);

        assert_eq!(table.current(), 1);
        assert!(table.take_parked(0).is_some());
        assert!(table.take_parked(0).is_none());
    }

    #[test]
    fn test_reload_clamps_current() {
        let model = Arc::new(fixture_model(true));
        let mut table = LodTable::new(descriptors(), model.clone());

        table.switch(2, LodScene::new(SceneTree::from_source(&model.root)));
        let target = table.reload(vec![LodDescriptor::new(String::new(), 0.0, 15.0), LodDescriptor::new("b.kn5".to_owned(), 15.0, 50.0)]);

        assert_eq!(target, Some(1));
        assert_eq!(table.count(), 2);
        assert!(table.take_parked(0).is_some());
    }
}
