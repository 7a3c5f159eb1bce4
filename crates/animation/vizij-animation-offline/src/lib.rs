//! Vizij Animation Offline
//!
//! Offline optimization of raw skeletal animations:
//! - [`AnimationOptimizer`] decimates redundant or interpolable keyframes while
//!   bounding the error generated on each joint's whole descendant hierarchy,
//!   with per-joint setting overrides and an optional step [`Observer`].
//! - [`AnimationConstantOptimizer`] strips tracks that do not vary beyond
//!   tolerance, regardless of hierarchy.
//!
//! ```
//! use vizij_animation_offline::{
//!     AnimationOptimizer, JointTrack, Keyframe, RawAnimation, Skeleton,
//! };
//!
//! let skeleton = Skeleton::from_parents(&[None]).unwrap();
//! let input = RawAnimation {
//!     name: "slide".into(),
//!     duration: 1.0,
//!     tracks: vec![JointTrack {
//!         translations: (0..=4)
//!             .map(|i| Keyframe::new(i as f32 * 0.25, [i as f32, 0.0, 0.0]))
//!             .collect(),
//!         rotations: vec![Keyframe::new(0.0, [0.0, 0.0, 0.0, 1.0])],
//!         scales: vec![Keyframe::new(0.0, [1.0, 1.0, 1.0])],
//!     }],
//! };
//! let mut output = RawAnimation::default();
//! AnimationOptimizer::default()
//!     .optimize(&input, &skeleton, &mut output)
//!     .unwrap();
//! assert_eq!(output.tracks[0].translations.len(), 2);
//! ```

pub mod config;
pub mod constant;
pub mod decimate;
pub mod error;
pub mod hierarchy;
pub mod math;
pub mod observer;
pub mod optimizer;
pub mod raw_animation;
pub mod skeleton;

// Re-exports for consumers (asset pipeline tools)
pub use config::{JointsSetting, Setting};
pub use constant::AnimationConstantOptimizer;
pub use decimate::{
    decimate_track, ErrorAdapter, RotationAdapter, ScaleAdapter, TrackDecimation,
    TranslationAdapter,
};
pub use error::{OptimizeError, OptimizeResult};
pub use hierarchy::{JointSpec, ToleranceResolver};
pub use observer::{Observer, ObserverData};
pub use optimizer::{AnimationOptimizer, OptimizationReport};
pub use raw_animation::{
    sample_keys, JointTrack, Keyframe, RawAnimation, RotationKey, ScaleKey, TrackKind,
    TranslationKey, ValidationError,
};
pub use skeleton::{Joint, Skeleton, SkeletonError};
