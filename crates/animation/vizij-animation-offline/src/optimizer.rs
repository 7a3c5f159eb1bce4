//! Hierarchical keyframe optimizer.
//!
//! Decimates redundant / interpolable keyframes within error tolerances. For
//! each joint the error generated on its whole child hierarchy is taken into
//! account: a small error on the shoulder is magnified when propagated to the
//! fingers. Overriding a joint's setting implicitly affects the whole chain up
//! to that joint, allowing e.g. aggressive optimization of a skeleton except
//! for the chain leading to a hand.
//!
//! Joints are optimized sequentially; the observer is a `&mut` borrow and is
//! only ever called from the calling thread.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{JointsSetting, Setting};
use crate::decimate::{
    decimate_track, ErrorAdapter, RotationAdapter, ScaleAdapter, TrackDecimation,
    TranslationAdapter,
};
use crate::error::{OptimizeError, OptimizeResult};
use crate::hierarchy::{JointSpec, ToleranceResolver};
use crate::observer::Observer;
use crate::raw_animation::{JointTrack, Keyframe, RawAnimation};
use crate::skeleton::Skeleton;

/// Summary of a successful optimizer run.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptimizationReport {
    pub original_keys: usize,
    pub optimized_keys: usize,
    /// Decimation attempts across all tracks.
    pub iterations: usize,
    /// Tracks whose decimation the observer stopped early.
    pub cancelled_tracks: usize,
}

/// Validates `result` and moves it into `output`. On any error `output` is
/// reset to the empty animation.
pub(crate) fn commit_output(
    output: &mut RawAnimation,
    result: OptimizeResult<RawAnimation>,
) -> OptimizeResult<OptimizationReport> {
    *output = RawAnimation::default();
    let animation = match result {
        Ok(animation) => animation,
        Err(err) => {
            warn!("animation optimization failed: {err}");
            return Err(err);
        }
    };
    if let Err(err) = animation.validate() {
        warn!("optimized animation '{}' is invalid: {err}", animation.name);
        return Err(OptimizeError::InvalidOutput(err));
    }
    let report = OptimizationReport {
        optimized_keys: animation.num_keys(),
        ..Default::default()
    };
    *output = animation;
    Ok(report)
}

/// Optimizes raw animations with a key frame reduction technique.
///
/// Default tolerances favor quality over runtime performance and memory
/// footprint.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AnimationOptimizer {
    /// Global optimization settings, used by every joint without an override.
    #[serde(default)]
    pub setting: Setting,
    /// Per joint override of optimization settings.
    #[serde(default)]
    pub joints_setting_override: JointsSetting,
}

impl AnimationOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load optimizer settings from JSON, e.g.
    /// `{ "setting": { "tolerance": 0.001, "distance": 0.1 },
    ///    "joints_setting_override": { "12": { "tolerance": 1e-5, "distance": 0.1 } } }`.
    pub fn from_json(s: &str) -> OptimizeResult<Self> {
        let optimizer: Self = serde_json::from_str(s)?;
        optimizer.validate_settings()?;
        Ok(optimizer)
    }

    /// Override the setting of a single joint.
    pub fn with_joint_setting(mut self, joint: usize, setting: Setting) -> Self {
        self.joints_setting_override.insert(joint, setting);
        self
    }

    /// The joint's own setting, before hierarchical resolution.
    pub fn joint_setting(&self, joint: usize) -> Setting {
        self.resolver().joint_setting(joint)
    }

    pub fn resolver(&self) -> ToleranceResolver<'_> {
        ToleranceResolver::new(self.setting, &self.joints_setting_override)
    }

    fn validate_settings(&self) -> OptimizeResult<()> {
        self.setting.validate(None)?;
        let mut overrides: Vec<_> = self.joints_setting_override.iter().collect();
        overrides.sort_unstable_by_key(|(joint, _)| **joint);
        for (joint, setting) in overrides {
            setting.validate(Some(*joint))?;
        }
        Ok(())
    }

    /// Optimizes `input` into `output`, replacing its content. `skeleton` is
    /// required to evaluate the error along the joint hierarchy.
    ///
    /// On failure `output` is reset to the empty animation.
    pub fn optimize(
        &self,
        input: &RawAnimation,
        skeleton: &Skeleton,
        output: &mut RawAnimation,
    ) -> OptimizeResult<OptimizationReport> {
        self.optimize_impl(input, skeleton, output, None)
    }

    /// Same as [`optimize`](Self::optimize), reporting each decimation step to
    /// `observer`. The observer may stop the current track by returning `false`.
    pub fn optimize_with_observer(
        &self,
        input: &RawAnimation,
        skeleton: &Skeleton,
        output: &mut RawAnimation,
        observer: &mut dyn Observer,
    ) -> OptimizeResult<OptimizationReport> {
        self.optimize_impl(input, skeleton, output, Some(observer))
    }

    fn optimize_impl(
        &self,
        input: &RawAnimation,
        skeleton: &Skeleton,
        output: &mut RawAnimation,
        observer: Option<&mut dyn Observer>,
    ) -> OptimizeResult<OptimizationReport> {
        let mut stats = OptimizationReport::default();
        let result = self.run(input, skeleton, observer, &mut stats);
        let report = commit_output(output, result)?;
        Ok(OptimizationReport {
            optimized_keys: report.optimized_keys,
            ..stats
        })
    }

    fn run(
        &self,
        input: &RawAnimation,
        skeleton: &Skeleton,
        mut observer: Option<&mut (dyn Observer + '_)>,
        stats: &mut OptimizationReport,
    ) -> OptimizeResult<RawAnimation> {
        self.validate_settings()?;
        input.validate().map_err(OptimizeError::InvalidInput)?;
        if input.num_tracks() != skeleton.num_joints() {
            return Err(OptimizeError::JointCountMismatch {
                animation: input.num_tracks(),
                skeleton: skeleton.num_joints(),
            });
        }

        info!(
            "optimizing '{}': {} joints, {} keys",
            input.name,
            input.num_tracks(),
            input.num_keys()
        );
        stats.original_keys = input.num_keys();

        let specs = self.resolver().resolve(skeleton, input);
        let mut tracks = Vec::with_capacity(input.num_tracks());
        for (joint, (track, spec)) in input.tracks.iter().zip(&specs).enumerate() {
            let optimized = JointTrack {
                translations: run_track(
                    &track.translations,
                    &TranslationAdapter::from_spec(spec),
                    joint,
                    spec,
                    observer.as_deref_mut(),
                    stats,
                ),
                rotations: run_track(
                    &track.rotations,
                    &RotationAdapter::from_spec(spec),
                    joint,
                    spec,
                    observer.as_deref_mut(),
                    stats,
                ),
                scales: run_track(
                    &track.scales,
                    &ScaleAdapter::from_spec(spec),
                    joint,
                    spec,
                    observer.as_deref_mut(),
                    stats,
                ),
            };
            debug!(
                "joint {joint} ({}): {} -> {} keys, tolerance={} distance={} ratio={}",
                skeleton.joint_name(joint).unwrap_or_default(),
                track.num_keys(),
                optimized.num_keys(),
                spec.tolerance,
                spec.distance,
                spec.hierarchy_error_ratio
            );
            tracks.push(optimized);
        }

        let optimized = RawAnimation {
            name: input.name.clone(),
            duration: input.duration,
            tracks,
        };
        info!(
            "optimized '{}': {} -> {} keys ({} iterations)",
            input.name,
            stats.original_keys,
            optimized.num_keys(),
            stats.iterations
        );
        Ok(optimized)
    }
}

fn run_track<A: ErrorAdapter>(
    keys: &[Keyframe<A::Value>],
    adapter: &A,
    joint: usize,
    spec: &JointSpec,
    observer: Option<&mut (dyn Observer + '_)>,
    stats: &mut OptimizationReport,
) -> Vec<Keyframe<A::Value>> {
    let TrackDecimation {
        keys,
        iterations,
        cancelled,
        ..
    } = decimate_track(keys, adapter, joint, spec, observer);
    stats.iterations += iterations;
    if cancelled {
        warn!("observer stopped {} decimation of joint {joint}", A::KIND);
        stats.cancelled_tracks += 1;
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_resets_output_on_error() {
        let mut output = RawAnimation {
            name: "stale".into(),
            duration: 3.0,
            tracks: vec![JointTrack::default()],
        };
        let err = commit_output(
            &mut output,
            Err(OptimizeError::JointCountMismatch {
                animation: 1,
                skeleton: 2,
            }),
        )
        .unwrap_err();
        assert!(matches!(err, OptimizeError::JointCountMismatch { .. }));
        assert_eq!(output, RawAnimation::default());
    }

    #[test]
    fn commit_rejects_invalid_animation() {
        let mut output = RawAnimation::default();
        let bad = RawAnimation {
            name: "bad".into(),
            duration: -1.0,
            tracks: Vec::new(),
        };
        let err = commit_output(&mut output, Ok(bad)).unwrap_err();
        assert!(matches!(err, OptimizeError::InvalidOutput(_)));
        assert_eq!(output, RawAnimation::default());
    }

    #[test]
    fn from_json_reads_overrides() {
        let optimizer = AnimationOptimizer::from_json(
            r#"{
                "setting": { "tolerance": 0.002, "distance": 0.2 },
                "joints_setting_override": { "3": { "tolerance": 1e-5, "distance": 0.1 } }
            }"#,
        )
        .unwrap();
        assert_eq!(optimizer.setting, Setting::new(0.002, 0.2));
        assert_eq!(optimizer.joint_setting(3), Setting::new(1e-5, 0.1));
        assert_eq!(optimizer.joint_setting(4), Setting::new(0.002, 0.2));

        let err = AnimationOptimizer::from_json(
            r#"{ "joints_setting_override": { "1": { "tolerance": -1.0, "distance": 0.1 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            OptimizeError::InvalidSetting { joint: Some(1), .. }
        ));
    }
}
