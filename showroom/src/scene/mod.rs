//! Scene graph of one loaded level of detail.
//!
//! Nodes live in a generational arena and refer to each other by [`NodeKey`].
//! Children are owned by exactly one parent; lookups by name or role are
//! non-owning indices that are rebuilt whenever the structure changes.
//! Model space matrices and bounding boxes are cached per node and dropped
//! as soon as a transform above or below them changes.

mod node;
mod roles;

use cgmath::{Matrix4, SquareMatrix, Vector3};
use hashbrown::HashMap;
use showroom_util::collision::AABB;
use showroom_util::container::GenerationalSlab;
use showroom_util::create_generational_key;
use showroom_util::math::invert_or_identity;

pub use self::node::{BoneBinding, Drawable, DrawableFlags, SceneNode};
pub use self::roles::{NodeRole, RoleTable};
use crate::loaders::SourceNode;

create_generational_key!(NodeKey, "Key of a node inside a scene tree");

pub struct SceneTree {
    nodes: GenerationalSlab<NodeKey, SceneNode>,
    root: NodeKey,
    names: HashMap<String, NodeKey>,
    roles: RoleTable,
    transform: Matrix4<f32>,
}

impl SceneTree {
    pub fn from_source(source: &SourceNode) -> Self {
        let mut nodes = GenerationalSlab::new();
        let root = Self::insert_source(&mut nodes, None, source);

        let mut tree = Self {
            nodes,
            root,
            names: HashMap::new(),
            roles: RoleTable::default(),
            transform: Matrix4::identity(),
        };

        tree.rebuild_index();
        tree
    }

    fn insert_source(nodes: &mut GenerationalSlab<NodeKey, SceneNode>, parent: Option<NodeKey>, source: &SourceNode) -> NodeKey {
        let key = nodes.insert(SceneNode::from_source(source, parent));
        let children = source
            .children
            .iter()
            .map(|child| Self::insert_source(nodes, Some(key), child))
            .collect();

        if let Some(node) = nodes.get_mut(key) {
            node.children = children;
        }

        key
    }

    fn rebuild_index(&mut self) {
        let mut names = HashMap::new();

        for key in self.descendants(self.root) {
            if let Some(node) = self.nodes.get(key) {
                names.entry(node.name.to_ascii_lowercase()).or_insert(key);
            }
        }

        let roles = RoleTable::build(
            self.descendants(self.root)
                .into_iter()
                .filter_map(|key| self.nodes.get(key).map(|node| (node.name.as_str(), key))),
        );

        self.names = names;
        self.roles = roles;
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn get(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Finds the first node with the given name, ignoring case.
    pub fn find(&self, name: &str) -> Option<NodeKey> {
        self.names.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn role(&self, role: NodeRole) -> Option<NodeKey> {
        self.roles.get(role)
    }

    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    /// Pre-order list of the node and everything below it.
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut result = Vec::new();
        let mut stack = vec![key];

        while let Some(key) = stack.pop() {
            if let Some(node) = self.nodes.get(key) {
                result.push(key);
                stack.extend(node.children.iter().rev().copied());
            }
        }

        result
    }

    pub fn depth(&self, key: NodeKey) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(key).and_then(|node| node.parent);

        while let Some(parent) = current {
            depth += 1;
            current = self.nodes.get(parent).and_then(|node| node.parent);
        }

        depth
    }

    /// Placement of the whole tree in the world.
    pub fn transform(&self) -> Matrix4<f32> {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.transform = transform;
    }

    pub fn local(&self, key: NodeKey) -> Option<Matrix4<f32>> {
        self.nodes.get(key).map(|node| node.local)
    }

    /// Moves a node. The first call remembers the node's original local
    /// transform, later calls never overwrite it.
    pub fn set_local(&mut self, key: NodeKey, local: Matrix4<f32>) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };

        if node.original_local.is_none() {
            node.original_local = Some(node.local);
        }

        node.local = local;
        self.invalidate_transform(key);
    }

    /// Moves a node so that its model space matrix becomes `model`.
    pub fn set_model_matrix(&mut self, key: NodeKey, model: Matrix4<f32>) {
        let parent_model = self
            .nodes
            .get(key)
            .and_then(|node| node.parent)
            .map(|parent| self.model_matrix(parent))
            .unwrap_or_else(Matrix4::identity);

        self.set_local(key, invert_or_identity(&parent_model) * model);
    }

    /// Restores the local transform the node had before it was first moved.
    pub fn restore_original(&mut self, key: NodeKey) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };

        if let Some(original) = node.original_local {
            if node.local != original {
                node.local = original;
                self.invalidate_transform(key);
            }
        }
    }

    pub fn original_local(&self, key: NodeKey) -> Option<Matrix4<f32>> {
        self.nodes.get(key).map(SceneNode::original_local)
    }

    /// Node to tree root space, including the root's own local transform.
    pub fn model_matrix(&self, key: NodeKey) -> Matrix4<f32> {
        let Some(node) = self.nodes.get(key) else {
            return Matrix4::identity();
        };

        if let Some(matrix) = node.model.get() {
            return matrix;
        }

        let matrix = match node.parent {
            Some(parent) => self.model_matrix(parent) * node.local,
            None => node.local,
        };

        node.model.set(Some(matrix));
        matrix
    }

    /// Model matrix the node had before anything in its chain was moved.
    pub fn original_model_matrix(&self, key: NodeKey) -> Matrix4<f32> {
        let Some(node) = self.nodes.get(key) else {
            return Matrix4::identity();
        };

        match node.parent {
            Some(parent) => self.original_model_matrix(parent) * node.original_local(),
            None => node.original_local(),
        }
    }

    pub fn world_matrix(&self, key: NodeKey) -> Matrix4<f32> {
        self.transform * self.model_matrix(key)
    }

    pub fn is_enabled(&self, key: NodeKey) -> bool {
        self.nodes.get(key).is_some_and(|node| node.enabled)
    }

    /// Returns true if the node and all of its ancestors are enabled.
    pub fn is_visible(&self, key: NodeKey) -> bool {
        let mut current = Some(key);

        while let Some(key) = current {
            match self.nodes.get(key) {
                Some(node) if node.enabled => current = node.parent,
                _ => return false,
            }
        }

        true
    }

    pub fn set_enabled(&mut self, key: NodeKey, enabled: bool) {
        let Some(node) = self.nodes.get_mut(key) else {
            return;
        };

        if node.enabled != enabled {
            node.enabled = enabled;
            self.invalidate_bounds(key);
        }
    }

    pub fn drawable_mut(&mut self, key: NodeKey) -> Option<&mut Drawable> {
        self.nodes.get_mut(key).and_then(|node| node.drawable.as_mut())
    }

    pub fn set_emissive(&mut self, key: NodeKey, emissive: Option<Vector3<f32>>) {
        if let Some(drawable) = self.drawable_mut(key) {
            drawable.emissive = emissive;
        }
    }

    /// Turns every drawable below the node into a mirror surface.
    pub fn set_mirror(&mut self, key: NodeKey) {
        for key in self.descendants(key) {
            if let Some(drawable) = self.drawable_mut(key) {
                drawable.flags.insert(DrawableFlags::MIRROR);
                drawable.flags.remove(DrawableFlags::REFLECTABLE);
            }
        }
    }

    /// Model space bounds of the node and its enabled children.
    pub fn bounding_box(&self, key: NodeKey) -> AABB {
        let Some(node) = self.nodes.get(key) else {
            return AABB::uninitialized();
        };

        if let Some(bounds) = node.bounds.get() {
            return bounds;
        }

        let mut bounds = AABB::uninitialized();

        if node.enabled {
            if let Some(drawable) = &node.drawable {
                bounds.extend(&drawable.local_bounds.transformed(&self.model_matrix(key)));
            }

            for child in &node.children {
                bounds.extend(&self.bounding_box(*child));
            }
        }

        node.bounds.set(Some(bounds));
        bounds
    }

    pub fn root_bounding_box(&self) -> AABB {
        self.bounding_box(self.root)
    }

    /// Attaches a copy of another model's tree below `parent`. The copy's
    /// root gets `placement` applied on top of its own transform.
    pub fn graft(&mut self, parent: NodeKey, source: &SourceNode, placement: Matrix4<f32>) -> Option<NodeKey> {
        if !self.nodes.contains_key(parent) {
            return None;
        }

        let key = Self::insert_source(&mut self.nodes, Some(parent), source);

        if let Some(node) = self.nodes.get_mut(key) {
            node.local = placement * node.local;
        }

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(key);
        }

        self.invalidate_bounds(parent);
        self.rebuild_index();

        Some(key)
    }

    /// Removes a node and everything below it. The root can not be removed.
    pub fn remove_subtree(&mut self, key: NodeKey) -> bool {
        if key == self.root {
            return false;
        }

        let Some(parent) = self.nodes.get(key).and_then(|node| node.parent) else {
            return false;
        };

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|child| *child != key);
        }

        for key in self.descendants(key) {
            let _ = self.nodes.remove(key);
        }

        self.invalidate_bounds(parent);
        self.rebuild_index();

        true
    }

    /// Skinning matrices of a drawable, one per bone. Bones whose dummy does
    /// not exist in this tree keep their bind pose.
    pub fn bone_matrices(&self, key: NodeKey) -> Vec<Matrix4<f32>> {
        let Some(drawable) = self.nodes.get(key).and_then(|node| node.drawable.as_ref()) else {
            return Vec::new();
        };

        let inverse_model = invert_or_identity(&self.model_matrix(key));

        drawable
            .bones
            .iter()
            .map(|bone| {
                let target = bone.target.get().filter(|target| self.nodes.contains_key(*target)).or_else(|| {
                    let target = self.find(&bone.name);
                    bone.target.set(target);
                    target
                });

                match target {
                    Some(target) => inverse_model * self.model_matrix(target) * bone.bind_pose,
                    None => Matrix4::identity(),
                }
            })
            .collect()
    }

    /// Calls `visit` for every drawn drawable whose whole chain is enabled.
    pub fn visit_drawables(&self, mut visit: impl FnMut(NodeKey, &Drawable)) {
        let mut stack = vec![self.root];

        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };

            if !node.enabled {
                continue;
            }

            if let Some(drawable) = node.drawable.as_ref().filter(|drawable| drawable.is_drawn()) {
                visit(key, drawable);
            }

            stack.extend(node.children.iter().rev().copied());
        }
    }

    fn invalidate_transform(&self, key: NodeKey) {
        for key in self.descendants(key) {
            if let Some(node) = self.nodes.get(key) {
                node.model.set(None);
                node.bounds.set(None);
            }
        }

        self.invalidate_bounds(key);
    }

    fn invalidate_bounds(&self, key: NodeKey) {
        let mut current = Some(key);

        while let Some(key) = current {
            match self.nodes.get(key) {
                Some(node) => {
                    node.bounds.set(None);
                    current = node.parent;
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Matrix4, Point3, SquareMatrix, Vector2, Vector3, assert_relative_eq};

    use crate::data::WheelPosition;
    use crate::loaders::{MeshFlags, MeshGeometry, MeshVertex, SourceNode};
    use crate::scene::{NodeRole, SceneTree};

    fn cube(size: f32) -> MeshGeometry {
        let vertices = [-size, size]
            .into_iter()
            .flat_map(|x| [-size, size].into_iter().flat_map(move |y| [-size, size].into_iter().map(move |z| (x, y, z))))
            .map(|(x, y, z)| MeshVertex::new(Point3::new(x, y, z), Vector3::unit_y(), Vector2::new(0.0, 0.0)))
            .collect();

        MeshGeometry {
            vertices,
            indices: vec![0, 1, 2],
            bones: Vec::new(),
        }
    }

    fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::from_translation(Vector3::new(x, y, z))
    }

    fn sample_tree() -> SceneTree {
        let source = SourceNode::group("root", Matrix4::identity()).with_children(vec![
            SourceNode::group("WHEEL_LF", translation(1.0, 0.0, 0.0)).with_children(vec![SourceNode::mesh(
                "rim",
                translation(0.0, 1.0, 0.0),
                0,
                cube(0.5),
            )]),
            SourceNode::mesh("BODY", Matrix4::identity(), 1, cube(1.0)),
        ]);

        SceneTree::from_source(&source)
    }

    #[test]
    fn test_find_ignores_case() {
        let tree = sample_tree();

        assert!(tree.find("wheel_lf").is_some());
        assert!(tree.find("Body").is_some());
        assert!(tree.find("missing").is_none());
        assert_eq!(tree.role(NodeRole::Wheel(WheelPosition::LeftFront)), tree.find("WHEEL_LF"));
        assert_eq!(tree.roles().len(), 1);
    }

    #[test]
    fn test_world_matrix_follows_parent() {
        let mut tree = sample_tree();
        let wheel = tree.find("WHEEL_LF").unwrap();
        let rim = tree.find("rim").unwrap();

        assert_relative_eq!(tree.model_matrix(rim), translation(1.0, 1.0, 0.0));

        tree.set_local(wheel, translation(2.0, 0.0, 0.0));
        assert_relative_eq!(tree.model_matrix(rim), translation(2.0, 1.0, 0.0));

        tree.set_transform(translation(0.0, 0.0, 5.0));
        assert_relative_eq!(tree.world_matrix(rim), translation(2.0, 1.0, 5.0));
    }

    #[test]
    fn test_original_local_is_kept() {
        let mut tree = sample_tree();
        let wheel = tree.find("WHEEL_LF").unwrap();

        tree.set_local(wheel, translation(2.0, 0.0, 0.0));
        tree.set_local(wheel, translation(3.0, 0.0, 0.0));
        assert_relative_eq!(tree.original_local(wheel).unwrap(), translation(1.0, 0.0, 0.0));

        tree.restore_original(wheel);
        assert_relative_eq!(tree.local(wheel).unwrap(), translation(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_bounding_box_invalidated_on_move() {
        let mut tree = sample_tree();
        let wheel = tree.find("WHEEL_LF").unwrap();

        let before = tree.root_bounding_box();
        assert_relative_eq!(before.max(), Point3::new(1.5, 1.5, 1.0));

        tree.set_local(wheel, translation(4.0, 0.0, 0.0));

        let after = tree.root_bounding_box();
        assert_relative_eq!(after.max(), Point3::new(4.5, 1.5, 1.0));
        assert_relative_eq!(tree.bounding_box(wheel).min(), Point3::new(3.5, 0.5, -0.5));
    }

    #[test]
    fn test_disabled_nodes_are_skipped() {
        let mut tree = sample_tree();
        let wheel = tree.find("WHEEL_LF").unwrap();
        let rim = tree.find("rim").unwrap();

        tree.set_enabled(wheel, false);

        assert!(!tree.is_visible(rim));
        assert_relative_eq!(tree.root_bounding_box().max(), Point3::new(1.0, 1.0, 1.0));

        let mut drawn = Vec::new();
        tree.visit_drawables(|key, _| drawn.push(key));
        assert_eq!(drawn, vec![tree.find("BODY").unwrap()]);
    }

    #[test]
    fn test_inactive_source_nodes_start_disabled() {
        let source = SourceNode::group("root", Matrix4::identity())
            .with_children(vec![SourceNode::group("CINTURE_ON", Matrix4::identity()).with_flags(MeshFlags::empty())]);
        let tree = SceneTree::from_source(&source);

        assert!(!tree.is_enabled(tree.find("CINTURE_ON").unwrap()));
    }

    #[test]
    fn test_graft_and_remove() {
        let mut tree = sample_tree();
        let driver = SourceNode::group("DRIVER:ROOT", Matrix4::identity())
            .with_children(vec![SourceNode::group("DRIVER:RIG_HAND_L", translation(0.0, 1.0, 0.0))]);

        let key = tree.graft(tree.root(), &driver, translation(0.0, 0.0, 2.0)).unwrap();
        let hand = tree.find("driver:rig_hand_l").unwrap();

        assert_relative_eq!(tree.model_matrix(hand), translation(0.0, 1.0, 2.0));

        assert!(tree.remove_subtree(key));
        assert!(tree.find("DRIVER:RIG_HAND_L").is_none());
        assert!(!tree.contains(hand));
        assert!(!tree.remove_subtree(tree.root()));
    }

    #[test]
    fn test_set_model_matrix() {
        let mut tree = sample_tree();
        let rim = tree.find("rim").unwrap();

        tree.set_model_matrix(rim, translation(0.0, 0.0, 3.0));

        assert_relative_eq!(tree.local(rim).unwrap(), translation(-1.0, 0.0, 3.0));
        assert_relative_eq!(tree.original_model_matrix(rim), translation(1.0, 1.0, 0.0));
    }
}
