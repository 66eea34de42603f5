use bevy::{platform::collections::HashMap, transform::components::Transform};
use serde::{Deserialize, Serialize};

use super::{Constraint, NodeKind, Skeleton};
use crate::{errors::SkeletonError, id::NodeIndex};

/// On-disk form of a [`Skeleton`] (`*.skel.ron`). Nodes refer to their parent by name and
/// must be listed after it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkeletonSerial {
    pub nodes: Vec<NodeSerial>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSerial {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub rest: Transform,
}

impl SkeletonSerial {
    pub fn to_value(&self) -> Result<Skeleton, SkeletonError> {
        let mut builder = Skeleton::builder();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        for node in &self.nodes {
            let parent = match &node.parent {
                Some(parent_name) => Some(
                    indices
                        .get(parent_name.as_str())
                        .copied()
                        .ok_or_else(|| SkeletonError::UnknownParentName(parent_name.clone()))?,
                ),
                None => None,
            };
            let index = builder.add_node(node.name.clone(), parent, node.kind, node.rest)?;
            indices.insert(node.name.as_str(), index);
        }

        for constraint in &self.constraints {
            builder.add_constraint(constraint.body_a, constraint.body_b);
        }

        builder.build()
    }
}
