//! Driver model attached to the cockpit, posed to hold the steering wheel.

mod grip;
mod rig;

use std::path::Path;

use cgmath::{InnerSpace, Matrix4, Point3};
#[cfg(feature = "debug")]
use showroom_debug::logging::{Colorize, Timer, print_debug};
use showroom_util::container::ResourceState;
use showroom_util::math::{matrix_translation, multiply_matrix4_and_point3};

pub use self::grip::{ArmPose, DriverGripSolver, GripInput, HandSide, HeuristicGripSolver, NoGripSolver};
pub use self::rig::ArmRig;
use crate::data::CarData;
use crate::loaders::{HierarchyData, LoadError, MeshSource, SourceNode};
use crate::scene::{NodeKey, NodeRole, SceneTree};
use crate::settings::GripSettings;

const NAME_PREFIX: &str = "DRIVER:";

/// Copies the driver's node tree, prefixing every name so the rig can not
/// collide with car nodes, and applies the base pose of `hierarchy`.
pub fn prepare_driver_source(source: &SourceNode, hierarchy: Option<&HierarchyData>) -> SourceNode {
    let mut node = source.clone();
    prepare_node(&mut node, hierarchy);
    node
}

fn prepare_node(node: &mut SourceNode, hierarchy: Option<&HierarchyData>) {
    if let Some(transform) = hierarchy.and_then(|hierarchy| hierarchy.transforms.get(&node.name)) {
        node.transform = *transform;
    }

    if !node.name.starts_with(NAME_PREFIX) {
        node.name = format!("{NAME_PREFIX}{}", node.name);
    }

    for child in &mut node.children {
        prepare_node(child, hierarchy);
    }
}

struct DriverModel {
    source: SourceNode,
    placement: Matrix4<f32>,
}

/// Lazily loaded driver and the solver posing its arms.
pub struct DriverState {
    model: ResourceState<DriverModel, LoadError>,
    solver: Box<dyn DriverGripSolver>,
    visible: bool,
}

impl DriverState {
    pub fn new(solver: Box<dyn DriverGripSolver>) -> Self {
        Self {
            model: ResourceState::Unloaded,
            solver,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_solver(&mut self, solver: Box<dyn DriverGripSolver>) {
        self.solver = solver;
    }

    /// Forgets the loaded model so it is read again on next use.
    pub fn reset(&mut self) {
        self.model.reset();
    }

    /// Loads the driver if it is visible and was not requested yet. Returns
    /// true if the model is available.
    pub fn ensure_loaded(&mut self, data: &dyn CarData, mesh_source: &dyn MeshSource, car_directory: &Path, content_root: &Path) -> bool {
        if !self.visible {
            return self.model.is_ready();
        }

        self.model
            .get_or_load(|| {
                let result = load_driver(data, mesh_source, car_directory, content_root);

                if let Err(_error) = &result {
                    #[cfg(feature = "debug")]
                    print_debug!("[{}] driver unavailable: {}", "error".red(), _error);
                }

                result
            })
            .is_some()
    }

    /// Grafts the driver into `tree` if it is not there yet and shows or
    /// hides it.
    pub fn attach(&self, tree: &mut SceneTree, attachment: &mut Option<NodeKey>) {
        if attachment.is_some_and(|key| !tree.contains(key)) {
            *attachment = None;
        }

        if attachment.is_none() && self.visible {
            if let Some(model) = self.model.ready() {
                let root = tree.root();
                *attachment = tree.graft(root, &model.source, model.placement);
            }
        }

        if let Some(key) = *attachment {
            tree.set_enabled(key, self.visible);
        }
    }

    /// Removes the driver from `tree`.
    pub fn detach(tree: &mut SceneTree, attachment: &mut Option<NodeKey>) {
        if let Some(key) = attachment.take() {
            tree.remove_subtree(key);
        }
    }

    /// Poses both arms so the hands rest on the steering wheel.
    pub fn update_grip(&self, tree: &mut SceneTree, attachment: Option<NodeKey>, cockpit_lr: bool, settings: &GripSettings) {
        let Some(driver) = attachment else {
            return;
        };

        if !self.visible || !tree.is_enabled(driver) {
            return;
        }

        let (preferred, other) = match cockpit_lr {
            true => (NodeRole::SteerWheelLr, NodeRole::SteerWheelHr),
            false => (NodeRole::SteerWheelHr, NodeRole::SteerWheelLr),
        };

        let Some(steer) = tree.role(preferred).or_else(|| tree.role(other)) else {
            return;
        };

        let steer_model = tree.model_matrix(steer);
        let unsteered = tree.original_model_matrix(steer);
        let center = matrix_translation(&steer_model);
        let axis = steer_model.z.truncate();
        let up = unsteered.y.truncate();

        if axis.magnitude2() < f32::EPSILON || up.magnitude2() < f32::EPSILON {
            return;
        }

        let bounds = tree.bounding_box(steer);
        let radius = match bounds.is_valid() && bounds.has_extent() {
            true => bounds.half_size().x.max(bounds.half_size().y),
            false => settings.fallback_wheel_radius,
        } * settings.grip_radius_factor;

        let angle = settings.grip_angle_degrees.to_radians();

        for side in HandSide::BOTH {
            let Some(rig) = ArmRig::bind(tree, side) else {
                continue;
            };

            let local = Point3::new(side.sign() * radius * angle.sin(), radius * angle.cos(), 0.0);
            let target = multiply_matrix4_and_point3(&steer_model, local);
            let input = rig.input(tree, target, center, axis.normalize(), up.normalize());

            if let Some(pose) = self.solver.solve(&input, settings) {
                rig.apply(tree, &pose, settings);
            }
        }
    }
}

fn load_driver(data: &dyn CarData, mesh_source: &dyn MeshSource, car_directory: &Path, content_root: &Path) -> Result<DriverModel, LoadError> {
    let description = data
        .driver_description()
        .ok_or_else(|| LoadError::MissingNode("driver description".to_owned()))?;

    #[cfg(feature = "debug")]
    let timer = Timer::new_dynamic(format!("load driver {}", description.name.magenta()));

    let path = content_root.join("driver").join(format!("{}.kn5", description.name));
    let model = mesh_source.load_model(&path)?;

    let hierarchy = description.hierarchy.as_ref().and_then(|hierarchy| {
        match mesh_source.load_hierarchy(&car_directory.join(hierarchy)) {
            Ok(hierarchy) => Some(hierarchy),
            Err(_error) => {
                #[cfg(feature = "debug")]
                print_debug!("[{}] driver base pose: {}", "error".red(), _error);

                None
            }
        }
    });

    let source = prepare_driver_source(&model.root, hierarchy.as_ref());

    #[cfg(feature = "debug")]
    timer.stop();

    Ok(DriverModel {
        source,
        placement: description.transform,
    })
}
