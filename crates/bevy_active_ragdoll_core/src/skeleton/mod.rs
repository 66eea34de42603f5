//! Id-indexed skeleton arena.
//!
//! The host engine owns a scene graph with parent pointers and physics bodies hanging off
//! nodes. The core only needs to know which nodes exist, how they are parented, and which of
//! them carry a rigid body. That is captured once, at ingestion, in a [`Skeleton`]; everything
//! afterwards is a pure function over the arena and a [`NodeIndex`].

pub mod serial;

use bevy::{
    asset::Asset, platform::collections::HashMap, reflect::Reflect,
    transform::components::Transform,
};
use serde::{Deserialize, Serialize};

use crate::{
    errors::SkeletonError,
    id::{BodyId, NodeIndex},
    pose::Pose,
};

/// The handful of host object kinds the core distinguishes.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[default]
    Plain,
    RigidBody {
        body: BodyId,
    },
    CollisionShape,
}

impl NodeKind {
    pub fn body(&self) -> Option<BodyId> {
        match self {
            NodeKind::RigidBody { body } => Some(*body),
            _ => None,
        }
    }
}

#[derive(Reflect, Debug, Clone)]
pub struct SkeletonNode {
    pub name: String,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    pub kind: NodeKind,
    /// Local transform used for nodes that are not driven by a pose
    pub rest: Transform,
}

/// A constraint linking two ragdoll bodies.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub body_a: BodyId,
    pub body_b: BodyId,
}

impl Constraint {
    /// If `body` takes part in this constraint, returns the body on the other end.
    pub fn other(&self, body: BodyId) -> Option<BodyId> {
        if self.body_a == body {
            Some(self.body_b)
        } else if self.body_b == body {
            Some(self.body_a)
        } else {
            None
        }
    }
}

#[derive(Asset, Reflect, Debug, Clone, Default)]
pub struct Skeleton {
    nodes: Vec<SkeletonNode>,
    by_name: HashMap<String, NodeIndex>,
    by_body: HashMap<BodyId, NodeIndex>,
    /// Rigid-body nodes in depth-first order. Poses and stress arrays follow this order.
    bones: Vec<NodeIndex>,
    bone_slots: HashMap<NodeIndex, usize>,
    constraints: Vec<Constraint>,
}

impl Skeleton {
    pub fn builder() -> SkeletonBuilder {
        SkeletonBuilder::default()
    }

    pub fn root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    pub fn node(&self, index: NodeIndex) -> Option<&SkeletonNode> {
        self.nodes.get(index.index())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.node(index)?.parent
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.node(index)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn find_node_by_name(&self, name: &str) -> Option<NodeIndex> {
        self.by_name.get(name).copied()
    }

    pub fn node_of_body(&self, body: BodyId) -> Option<NodeIndex> {
        self.by_body.get(&body).copied()
    }

    pub fn bones(&self) -> &[NodeIndex] {
        &self.bones
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Position of a rigid-body node in pose arrays
    pub fn bone_slot(&self, index: NodeIndex) -> Option<usize> {
        self.bone_slots.get(&index).copied()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Walks parent links up to the top of the hierarchy.
    pub fn highest_parent(&self, mut index: NodeIndex) -> NodeIndex {
        while let Some(parent) = self.parent(index) {
            index = parent;
        }
        index
    }

    /// Depth-first pre-order walk starting at `start`. The visitor receives the node and its
    /// depth relative to `start`; returning `true` stops the walk. Returns whether the walk
    /// was stopped early.
    pub fn visit(
        &self,
        start: NodeIndex,
        mut visitor: impl FnMut(NodeIndex, &SkeletonNode, usize) -> bool,
    ) -> bool {
        let mut pending = vec![(start, 0)];
        while let Some((index, depth)) = pending.pop() {
            let Some(node) = self.node(index) else {
                continue;
            };
            if visitor(index, node, depth) {
                return true;
            }
            for child in node.children.iter().rev() {
                pending.push((*child, depth + 1));
            }
        }
        false
    }

    /// Whether `target` is `haystack` or one of its descendants.
    pub fn contains(&self, haystack: NodeIndex, target: NodeIndex) -> bool {
        self.visit(haystack, |index, _, _| index == target)
    }

    /// First rigid body found depth-first from `start`, including `start` itself.
    pub fn first_rigid_body(&self, start: NodeIndex) -> Option<BodyId> {
        let mut found = None;
        self.visit(start, |_, node, _| {
            found = node.kind.body();
            found.is_some()
        });
        found
    }

    /// Whether `body` is attached somewhere in the subtree of `start`.
    pub fn find_rigid_body(&self, start: NodeIndex, body: BodyId) -> bool {
        self.visit(start, |_, node, _| node.kind.body() == Some(body))
    }

    pub fn adjacent_bodies(&self, body: BodyId) -> impl Iterator<Item = BodyId> + '_ {
        self.constraints
            .iter()
            .filter_map(move |constraint| constraint.other(body))
    }

    pub fn body_has_constraint(&self, body: BodyId) -> bool {
        self.adjacent_bodies(body).next().is_some()
    }

    /// Composes local transforms down the hierarchy. Rigid-body nodes take their local
    /// transform from `pose` (falling back to the rest transform when the pose is short), all
    /// other nodes use their rest transform. Indexed like the arena.
    pub fn world_transforms(&self, pose: &Pose, root_world: Transform) -> Vec<Transform> {
        let mut world: Vec<Transform> = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let local = self
                .bone_slot(NodeIndex::from(i))
                .and_then(|slot| pose.bones.get(slot))
                .copied()
                .unwrap_or(node.rest);
            // Parents are always inserted before their children
            let parent_world = node
                .parent
                .and_then(|parent| world.get(parent.index()))
                .copied()
                .unwrap_or(root_world);
            world.push(parent_world * local);
        }
        world
    }

    /// World transforms of the pose bones only, in pose order.
    pub fn bone_world_transforms(&self, pose: &Pose, root_world: Transform) -> Vec<Transform> {
        let world = self.world_transforms(pose, root_world);
        self.bones
            .iter()
            .filter_map(|bone| world.get(bone.index()).copied())
            .collect()
    }

    /// Inverse of [`Skeleton::bone_world_transforms`]: recovers the local transform of every
    /// bone from world transforms given in pose order. Missing entries use the rest transform.
    pub fn pose_from_bone_world_transforms(
        &self,
        bone_worlds: &[Transform],
        root_world: Transform,
    ) -> Pose {
        let mut world: Vec<Transform> = Vec::with_capacity(self.nodes.len());
        let mut pose = Pose::identity(self.bones.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let parent_world = node
                .parent
                .and_then(|parent| world.get(parent.index()))
                .copied()
                .unwrap_or(root_world);
            let slot = self.bone_slot(NodeIndex::from(i));
            match slot.and_then(|slot| bone_worlds.get(slot).map(|w| (slot, *w))) {
                Some((slot, bone_world)) => {
                    pose.bones[slot] = local_from_world(&parent_world, &bone_world);
                    world.push(bone_world);
                }
                None => {
                    if let Some(slot) = slot {
                        pose.bones[slot] = node.rest;
                    }
                    world.push(parent_world * node.rest);
                }
            }
        }
        pose
    }
}

/// Local transform that places a node at `world` under a parent at `parent_world`.
pub fn local_from_world(parent_world: &Transform, world: &Transform) -> Transform {
    let inverse_rotation = parent_world.rotation.inverse();
    Transform {
        translation: inverse_rotation * (world.translation - parent_world.translation)
            / parent_world.scale,
        // Composed directly so the quaternion keeps the sign the pose was authored with
        rotation: (inverse_rotation * world.rotation).normalize(),
        scale: world.scale / parent_world.scale,
    }
}

#[derive(Debug, Default)]
pub struct SkeletonBuilder {
    nodes: Vec<SkeletonNode>,
    by_name: HashMap<String, NodeIndex>,
    by_body: HashMap<BodyId, NodeIndex>,
    constraints: Vec<Constraint>,
}

impl SkeletonBuilder {
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeIndex>,
        kind: NodeKind,
        rest: Transform,
    ) -> Result<NodeIndex, SkeletonError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(SkeletonError::DuplicateName(name));
        }
        match parent {
            Some(parent) if parent.index() >= self.nodes.len() => {
                return Err(SkeletonError::UnknownParent(parent));
            }
            None if !self.nodes.is_empty() => return Err(SkeletonError::MultipleRoots(name)),
            _ => {}
        }

        let index = NodeIndex::from(self.nodes.len());
        if let Some(body) = kind.body() {
            if self.by_body.contains_key(&body) {
                return Err(SkeletonError::DuplicateBody(body));
            }
            self.by_body.insert(body, index);
        }
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(index);
        }
        self.by_name.insert(name.clone(), index);
        self.nodes.push(SkeletonNode {
            name,
            parent,
            children: Vec::new(),
            kind,
            rest,
        });

        Ok(index)
    }

    pub fn add_constraint(&mut self, body_a: BodyId, body_b: BodyId) -> &mut Self {
        self.constraints.push(Constraint { body_a, body_b });
        self
    }

    pub fn build(self) -> Result<Skeleton, SkeletonError> {
        if self.nodes.is_empty() {
            return Err(SkeletonError::Empty);
        }
        for constraint in &self.constraints {
            for body in [constraint.body_a, constraint.body_b] {
                if !self.by_body.contains_key(&body) {
                    return Err(SkeletonError::UnknownBody(body));
                }
            }
        }

        let mut skeleton = Skeleton {
            nodes: self.nodes,
            by_name: self.by_name,
            by_body: self.by_body,
            bones: Vec::new(),
            bone_slots: HashMap::new(),
            constraints: self.constraints,
        };

        let mut bones = Vec::new();
        skeleton.visit(skeleton.root(), |index, node, _| {
            if node.kind.body().is_some() {
                bones.push(index);
            }
            false
        });
        skeleton.bone_slots = bones
            .iter()
            .enumerate()
            .map(|(slot, index)| (*index, slot))
            .collect();
        skeleton.bones = bones;

        Ok(skeleton)
    }
}
