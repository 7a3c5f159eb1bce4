//! Constant track stripping.
//!
//! Collapses every track whose keys all stay within tolerance of its first key
//! to that single key. Purely local: no hierarchy accounting.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{OptimizeError, OptimizeResult};
use crate::math::{compare_quat, distance_float3};
use crate::optimizer::{commit_output, OptimizationReport};
use crate::raw_animation::{JointTrack, Keyframe, RawAnimation};

/// Cosine of half of 0.5 degree.
pub const DEFAULT_ROTATION_TOLERANCE: f32 = 0.999_990_5;

/// Strips constant keyframes from a raw animation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnimationConstantOptimizer {
    /// Translation tolerance in meters. Uses euclidean distance.
    pub translation_tolerance: f32,
    /// Rotation tolerance, as the cosine of half the tolerance angle. Allows
    /// angles so small that their cosine would round to 1.
    pub rotation_tolerance: f32,
    /// Scale tolerance. Uses euclidean distance.
    pub scale_tolerance: f32,
}

impl Default for AnimationConstantOptimizer {
    fn default() -> Self {
        Self {
            translation_tolerance: 1e-3,
            rotation_tolerance: DEFAULT_ROTATION_TOLERANCE,
            scale_tolerance: 1e-3,
        }
    }
}

impl AnimationConstantOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build with a rotation tolerance given as an angle in radians.
    pub fn with_rotation_angle(mut self, angle: f32) -> Self {
        self.rotation_tolerance = (0.5 * angle).cos();
        self
    }

    fn validate(&self) -> OptimizeResult<()> {
        let distance_ok = |v: f32| v.is_finite() && v >= 0.0;
        if !distance_ok(self.translation_tolerance) {
            return Err(OptimizeError::InvalidTolerance {
                what: "translation",
                value: self.translation_tolerance,
            });
        }
        // A cosine: NaN and anything outside [-1, 1] are rejected.
        if !(-1.0..=1.0).contains(&self.rotation_tolerance) {
            return Err(OptimizeError::InvalidTolerance {
                what: "rotation",
                value: self.rotation_tolerance,
            });
        }
        if !distance_ok(self.scale_tolerance) {
            return Err(OptimizeError::InvalidTolerance {
                what: "scale",
                value: self.scale_tolerance,
            });
        }
        Ok(())
    }

    /// Optimizes `input` into `output`, replacing its content.
    ///
    /// On failure `output` is reset to the empty animation.
    pub fn optimize(
        &self,
        input: &RawAnimation,
        output: &mut RawAnimation,
    ) -> OptimizeResult<OptimizationReport> {
        let result = self.run(input);
        let report = commit_output(output, result)?;
        Ok(OptimizationReport {
            original_keys: input.num_keys(),
            ..report
        })
    }

    fn run(&self, input: &RawAnimation) -> OptimizeResult<RawAnimation> {
        self.validate()?;
        input.validate().map_err(OptimizeError::InvalidInput)?;

        let tracks = input
            .tracks
            .iter()
            .enumerate()
            .map(|(joint, track)| {
                let stripped = JointTrack {
                    translations: strip(&track.translations, |a, b| {
                        distance_float3(a, b) <= self.translation_tolerance
                    }),
                    rotations: strip(&track.rotations, |a, b| {
                        compare_quat(a, b, self.rotation_tolerance)
                    }),
                    scales: strip(&track.scales, |a, b| {
                        distance_float3(a, b) <= self.scale_tolerance
                    }),
                };
                debug!(
                    "joint {joint}: constant stripping {} -> {} keys",
                    track.num_keys(),
                    stripped.num_keys()
                );
                stripped
            })
            .collect();

        let optimized = RawAnimation {
            name: input.name.clone(),
            duration: input.duration,
            tracks,
        };
        info!(
            "constant optimizer '{}': {} -> {} keys",
            input.name,
            input.num_keys(),
            optimized.num_keys()
        );
        Ok(optimized)
    }
}

/// Single first key if every key matches it, the original keys otherwise.
fn strip<V: Copy>(keys: &[Keyframe<V>], same: impl Fn(V, V) -> bool) -> Vec<Keyframe<V>> {
    match keys.first() {
        Some(first) if keys.iter().all(|k| same(first.value, k.value)) => vec![*first],
        _ => keys.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_keeps_varying_tracks() {
        let keys = vec![Keyframe::new(0.0, 0.0f32), Keyframe::new(1.0, 1.0)];
        let out = strip(&keys, |a, b| (a - b).abs() <= 0.5);
        assert_eq!(out, keys);
        let out = strip(&keys, |a, b| (a - b).abs() <= 2.0);
        assert_eq!(out, vec![keys[0]]);
    }

    #[test]
    fn rotation_angle_builder() {
        let opt = AnimationConstantOptimizer::new().with_rotation_angle(0.5f32.to_radians());
        assert!((opt.rotation_tolerance - DEFAULT_ROTATION_TOLERANCE).abs() < 1e-6);
    }

    #[test]
    fn rejects_invalid_tolerances() {
        let opt = AnimationConstantOptimizer {
            scale_tolerance: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            opt.validate(),
            Err(OptimizeError::InvalidTolerance { what: "scale", .. })
        ));
    }

    #[test]
    fn rotation_tolerance_must_be_a_cosine() {
        for value in [-1.5, 1.01, f32::NAN, f32::NEG_INFINITY] {
            let opt = AnimationConstantOptimizer {
                rotation_tolerance: value,
                ..Default::default()
            };
            assert!(
                matches!(
                    opt.validate(),
                    Err(OptimizeError::InvalidTolerance { what: "rotation", .. })
                ),
                "{value}"
            );
        }
        for value in [-1.0, 0.0, 1.0] {
            let opt = AnimationConstantOptimizer {
                rotation_tolerance: value,
                ..Default::default()
            };
            assert!(opt.validate().is_ok(), "{value}");
        }
    }
}
