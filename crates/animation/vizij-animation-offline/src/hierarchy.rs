//! Hierarchical tolerance resolution.
//!
//! Every joint gets a [`JointSpec`] combining the global setting, per-joint
//! overrides and the skeleton hierarchy:
//!
//! - `scale` accumulates each joint's maximum animated scale from the root
//!   down (root-to-leaf pass).
//! - `tolerance` is the minimum tolerance over the joint's subtree, and
//!   `distance` is the reach of its descendant chain, never shorter than the
//!   joint's own distance setting (leaf-to-root pass). Overriding a finger
//!   therefore tightens the whole chain up to the shoulder.
//! - `hierarchy_error_ratio` splits the tolerance evenly across the tracks of
//!   every joint on the longest chain running through the joint. Translation,
//!   rotation and scale errors of all those joints add up at the chain's tip.

use log::{debug, warn};

use crate::config::{JointsSetting, Setting};
use crate::math::length_float3;
use crate::raw_animation::{JointTrack, RawAnimation, TrackKind};
use crate::skeleton::Skeleton;

/// Resolved optimization parameters of one joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointSpec {
    /// Minimum tolerance over the joint's subtree.
    pub tolerance: f32,
    /// Distance at which the joint's errors are measured (hierarchy length).
    pub distance: f32,
    /// Accumulated maximum scale, root to this joint included.
    pub scale: f32,
    /// Accumulated scale of the parent (1 for roots). Translations are
    /// expressed in the parent's space.
    pub parent_scale: f32,
    /// Fraction of `tolerance` each of this joint's tracks may spend, in
    /// (0, 1/3].
    pub hierarchy_error_ratio: f32,
}

impl JointSpec {
    /// Error bound applied to each of the joint's tracks.
    #[inline]
    pub fn own_tolerance(&self) -> f32 {
        self.tolerance * self.hierarchy_error_ratio
    }
}

/// Combines global settings, sparse overrides and the joint hierarchy.
#[derive(Clone, Copy, Debug)]
pub struct ToleranceResolver<'a> {
    setting: Setting,
    overrides: &'a JointsSetting,
}

impl<'a> ToleranceResolver<'a> {
    pub fn new(setting: Setting, overrides: &'a JointsSetting) -> Self {
        Self { setting, overrides }
    }

    /// The joint's own setting: its override if any, the global one otherwise.
    #[inline]
    pub fn joint_setting(&self, joint: usize) -> Setting {
        self.overrides.get(&joint).copied().unwrap_or(self.setting)
    }

    /// Resolve the parameters of every skeleton joint.
    ///
    /// `animation` provides animated bone lengths and scales; joints without a
    /// track (or with empty tracks) count as unit scale and zero length.
    pub fn resolve(&self, skeleton: &Skeleton, animation: &RawAnimation) -> Vec<JointSpec> {
        let num_joints = skeleton.num_joints();
        for &joint in self.overrides.keys() {
            if joint >= num_joints {
                warn!("ignoring setting override for unknown joint {joint} ({num_joints} joints)");
            }
        }

        let mut specs: Vec<JointSpec> = Vec::with_capacity(num_joints);
        let mut heights = vec![0usize; num_joints];

        // Root to leaf: parents precede children.
        for joint in 0..num_joints {
            let parent_scale = skeleton
                .parent(joint)
                .map(|p| specs[p].scale)
                .unwrap_or(1.0);
            let scale = max_animated_scale(animation.tracks.get(joint)) * parent_scale;
            let setting = self.joint_setting(joint);
            specs.push(JointSpec {
                tolerance: setting.tolerance,
                distance: setting.distance * scale,
                scale,
                parent_scale,
                hierarchy_error_ratio: 1.0,
            });
        }

        // Leaf to root: fold each joint into its parent.
        for joint in (0..num_joints).rev() {
            let Some(parent) = skeleton.parent(joint) else {
                continue;
            };
            let bone = max_translation_length(animation.tracks.get(joint));
            let child = specs[joint];
            let parent_spec = &mut specs[parent];
            parent_spec.distance = parent_spec
                .distance
                .max(child.distance + bone * parent_spec.scale);
            parent_spec.tolerance = parent_spec.tolerance.min(child.tolerance);
            heights[parent] = heights[parent].max(heights[joint] + 1);
        }

        for (joint, spec) in specs.iter_mut().enumerate() {
            let chain = skeleton.depth(joint) + 1 + heights[joint];
            spec.hierarchy_error_ratio = 1.0 / (chain * TrackKind::ALL.len()) as f32;
        }

        debug!(
            "resolved {} joint specs (global tolerance={}, distance={}, overrides={})",
            num_joints,
            self.setting.tolerance,
            self.setting.distance,
            self.overrides.len()
        );
        specs
    }
}

fn max_animated_scale(track: Option<&JointTrack>) -> f32 {
    match track {
        Some(track) if !track.scales.is_empty() => track
            .scales
            .iter()
            .flat_map(|k| k.value)
            .fold(0.0f32, |acc, c| acc.max(c.abs())),
        _ => 1.0,
    }
}

fn max_translation_length(track: Option<&JointTrack>) -> f32 {
    track
        .map(|t| {
            t.translations
                .iter()
                .fold(0.0f32, |acc, k| acc.max(length_float3(k.value)))
        })
        .unwrap_or(0.0)
}
