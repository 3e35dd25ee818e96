//! Pit crew standing next to the car.

use std::path::Path;

use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};
#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, Timer, print_debug};
use showroom_util::collision::AABB;
use showroom_util::container::ResourceState;
use showroom_util::math::invert_or_identity;

use crate::loaders::{LoadError, MeshSource, SourceNode};
use crate::scene::{NodeKey, SceneTree};

const SIDE_DISTANCE: f32 = 0.6;
const NAME_PREFIX: &str = "CREW:";

fn prefixed(node: &SourceNode) -> SourceNode {
    let mut node = node.clone();
    prefix_node(&mut node);
    node
}

fn prefix_node(node: &mut SourceNode) {
    if !node.name.starts_with(NAME_PREFIX) {
        node.name = format!("{NAME_PREFIX}{}", node.name);
    }

    node.children.iter_mut().for_each(prefix_node);
}

/// Model space placement of the two crew members, derived from the car
/// bounds. Each one stands on the ground beside the car, facing it.
pub fn crew_placements(bounds: &AABB) -> Option<[Matrix4<f32>; 2]> {
    if !bounds.is_valid() {
        return None;
    }

    let (min, max, center) = (bounds.min(), bounds.max(), bounds.center());

    let left = Matrix4::from_translation(Vector3::new(max.x + SIDE_DISTANCE, min.y, center.z)) * Matrix4::from_angle_y(Deg(-90.0));
    let right = Matrix4::from_translation(Vector3::new(min.x - SIDE_DISTANCE, min.y, center.z)) * Matrix4::from_angle_y(Deg(90.0));

    Some([left, right])
}

fn load_crew(mesh_source: &dyn MeshSource, content_root: &Path) -> Result<SourceNode, LoadError> {
    let directory = content_root.join("objects3D");
    let path = directory.join("pitcrew.kn5");

    #[cfg(feature = "debug")]
    let timer = Timer::new_dynamic(format!("load crew {}", path.display().magenta()));

    let body = mesh_source.load_model(&path)?;
    let mut children = vec![prefixed(&body.root)];

    match mesh_source.load_model(&directory.join("pitcrew_helmet.kn5")) {
        Ok(helmet) => children.push(prefixed(&helmet.root)),
        Err(_error) => {
            #[cfg(feature = "debug")]
            print_debug!("crew helmet unavailable: {}", _error);
        }
    }

    #[cfg(feature = "debug")]
    timer.stop();

    Ok(SourceNode::group(format!("{NAME_PREFIX}member"), Matrix4::identity()).with_children(children))
}

/// Lazily loaded crew model, shown on both sides of the car.
#[derive(Default)]
pub struct CrewState {
    model: ResourceState<SourceNode, LoadError>,
    visible: bool,
}

impl CrewState {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[cfg(test)]
    pub fn is_failed(&self) -> bool {
        self.model.is_failed()
    }

    pub fn reset(&mut self) {
        self.model.reset();
    }

    /// Reads the crew model once it is shown for the first time. Returns true
    /// if it is available.
    pub fn ensure_loaded(&mut self, mesh_source: &dyn MeshSource, content_root: &Path) -> bool {
        if !self.visible {
            return self.model.is_ready();
        }

        self.model
            .get_or_load(|| {
                let result = load_crew(mesh_source, content_root);

                if let Err(_error) = &result {
                    #[cfg(feature = "debug")]
                    print_debug!("[{}] crew unavailable: {}", "error".red(), _error);
                }

                result
            })
            .is_some()
    }

    /// Grafts both crew members into `tree` if they are not there yet and
    /// shows or hides them.
    pub fn attach(&self, tree: &mut SceneTree, attachments: &mut Vec<NodeKey>) {
        attachments.retain(|key| tree.contains(*key));

        if attachments.is_empty() && self.visible {
            if let Some(source) = self.model.ready() {
                let root = tree.root();
                let to_root = invert_or_identity(&tree.model_matrix(root));

                if let Some(placements) = crew_placements(&tree.root_bounding_box()) {
                    attachments.extend(
                        placements
                            .iter()
                            .filter_map(|placement| tree.graft(root, source, to_root * *placement)),
                    );
                }
            }
        }

        for key in attachments.iter() {
            tree.set_enabled(*key, self.visible);
        }
    }

    pub fn detach(tree: &mut SceneTree, attachments: &mut Vec<NodeKey>) {
        for key in attachments.drain(..) {
            tree.remove_subtree(key);
        }
    }
}
