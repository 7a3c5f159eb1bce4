//! Joint hierarchy view used by the hierarchical optimizer.
//!
//! Joints live in an arena indexed by integer id. Every joint stores its parent
//! index (`None` for roots) and parents always precede their children, so index
//! order is a valid root-to-leaf traversal and reverse index order a valid
//! leaf-to-root traversal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Joint {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent: Option<usize>,
}

impl Joint {
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkeletonError {
    #[error("joint {joint} references parent {parent} which is not a preceding joint")]
    InvalidParent { joint: usize, parent: usize },
}

/// Serialized form: the plain joint list, validated on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkeletonDef {
    pub joints: Vec<Joint>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "SkeletonDef", into = "SkeletonDef")]
pub struct Skeleton {
    joints: Vec<Joint>,
    depths: Vec<usize>,
}

impl TryFrom<SkeletonDef> for Skeleton {
    type Error = SkeletonError;

    fn try_from(def: SkeletonDef) -> Result<Self, Self::Error> {
        Skeleton::new(def.joints)
    }
}

impl From<Skeleton> for SkeletonDef {
    fn from(skeleton: Skeleton) -> Self {
        SkeletonDef {
            joints: skeleton.joints,
        }
    }
}

impl Skeleton {
    /// Build a skeleton, checking that every parent precedes its child.
    pub fn new(joints: Vec<Joint>) -> Result<Self, SkeletonError> {
        let mut depths = vec![0usize; joints.len()];
        for (joint, j) in joints.iter().enumerate() {
            if let Some(parent) = j.parent {
                if parent >= joint {
                    return Err(SkeletonError::InvalidParent { joint, parent });
                }
                depths[joint] = depths[parent] + 1;
            }
        }
        Ok(Self { joints, depths })
    }

    /// Convenience constructor from a parent table; joints are named `joint{i}`.
    pub fn from_parents(parents: &[Option<usize>]) -> Result<Self, SkeletonError> {
        Self::new(
            parents
                .iter()
                .enumerate()
                .map(|(i, &parent)| Joint::new(format!("joint{i}"), parent))
                .collect(),
        )
    }

    #[inline]
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    pub fn parent(&self, joint: usize) -> Option<usize> {
        self.joints.get(joint).and_then(|j| j.parent)
    }

    /// Number of ancestors of `joint` (0 for roots).
    #[inline]
    pub fn depth(&self, joint: usize) -> usize {
        self.depths.get(joint).copied().unwrap_or(0)
    }

    pub fn joint_name(&self, joint: usize) -> Option<&str> {
        self.joints.get(joint).map(|j| j.name.as_str())
    }

    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    /// Walks from `joint` up to its root, `joint` included.
    pub fn ancestors(&self, joint: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(
            (joint < self.num_joints()).then_some(joint),
            move |&j| self.parent(j),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_depths_and_ancestors() {
        let skeleton = Skeleton::from_parents(&[None, Some(0), Some(1), Some(0)]).unwrap();
        assert_eq!(skeleton.depth(0), 0);
        assert_eq!(skeleton.depth(2), 2);
        assert_eq!(skeleton.depth(3), 1);
        assert_eq!(skeleton.ancestors(2).collect::<Vec<_>>(), vec![2, 1, 0]);
    }

    #[test]
    fn rejects_parent_after_child() {
        let err = Skeleton::from_parents(&[Some(1), None]).unwrap_err();
        assert_eq!(err, SkeletonError::InvalidParent { joint: 0, parent: 1 });
    }

    #[test]
    fn deserialize_validates_parents() {
        let ok: Skeleton = serde_json::from_str(
            r#"{ "joints": [ { "name": "root" }, { "name": "tip", "parent": 0 } ] }"#,
        )
        .unwrap();
        assert_eq!(ok.find_joint("tip"), Some(1));
        assert_eq!(ok.parent(1), Some(0));

        let bad = serde_json::from_str::<Skeleton>(
            r#"{ "joints": [ { "name": "root", "parent": 0 } ] }"#,
        );
        assert!(bad.is_err());
    }
}
