//! Offline (raw) animation data model.
//!
//! A [`RawAnimation`] stores one [`JointTrack`] per skeleton joint, index-aligned
//! with the skeleton. Each joint track holds translation, rotation and scale
//! keyframes with absolute times in seconds, strictly increasing and within
//! `[0, duration]`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{Float3, Interpolate, Quaternion};

/// A single (time, value) sample of a track.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Keyframe<V> {
    /// Time in seconds, in `[0, duration]`.
    pub time: f32,
    pub value: V,
}

impl<V> Keyframe<V> {
    pub fn new(time: f32, value: V) -> Self {
        Self { time, value }
    }
}

pub type TranslationKey = Keyframe<Float3>;
pub type RotationKey = Keyframe<Quaternion>;
pub type ScaleKey = Keyframe<Float3>;

/// Transform component a track animates.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Translation,
    Rotation,
    Scale,
}

impl TrackKind {
    pub const ALL: [TrackKind; 3] = [TrackKind::Translation, TrackKind::Rotation, TrackKind::Scale];
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackKind::Translation => "translation",
            TrackKind::Rotation => "rotation",
            TrackKind::Scale => "scale",
        };
        f.write_str(name)
    }
}

/// Keyframe tracks of a single joint.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct JointTrack {
    #[serde(default)]
    pub translations: Vec<TranslationKey>,
    #[serde(default)]
    pub rotations: Vec<RotationKey>,
    #[serde(default)]
    pub scales: Vec<ScaleKey>,
}

impl JointTrack {
    /// Number of keys of the given track kind.
    pub fn len_of(&self, kind: TrackKind) -> usize {
        match kind {
            TrackKind::Translation => self.translations.len(),
            TrackKind::Rotation => self.rotations.len(),
            TrackKind::Scale => self.scales.len(),
        }
    }

    /// Total number of keys across all three tracks.
    pub fn num_keys(&self) -> usize {
        self.translations.len() + self.rotations.len() + self.scales.len()
    }

    fn validate(&self, joint: usize, duration: f32) -> Result<(), ValidationError> {
        validate_keys(&self.translations, joint, TrackKind::Translation, duration)?;
        validate_keys(&self.rotations, joint, TrackKind::Rotation, duration)?;
        validate_keys(&self.scales, joint, TrackKind::Scale, duration)
    }
}

/// Structural problems reported by [`RawAnimation::validate`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("animation duration must be finite and > 0 (got {0})")]
    InvalidDuration(f32),
    #[error("joint {joint} {kind} track has no keyframe")]
    EmptyTrack { joint: usize, kind: TrackKind },
    #[error("joint {joint} {kind} key {index} time {time} is outside [0, duration]")]
    KeyOutOfRange {
        joint: usize,
        kind: TrackKind,
        index: usize,
        time: f32,
    },
    #[error("joint {joint} {kind} key {index} time is not strictly increasing")]
    NonIncreasingTime {
        joint: usize,
        kind: TrackKind,
        index: usize,
    },
}

fn validate_keys<V>(
    keys: &[Keyframe<V>],
    joint: usize,
    kind: TrackKind,
    duration: f32,
) -> Result<(), ValidationError> {
    if keys.is_empty() {
        return Err(ValidationError::EmptyTrack { joint, kind });
    }
    let mut previous = -f32::INFINITY;
    for (index, key) in keys.iter().enumerate() {
        if !key.time.is_finite() || key.time < 0.0 || key.time > duration {
            return Err(ValidationError::KeyOutOfRange {
                joint,
                kind,
                index,
                time: key.time,
            });
        }
        if key.time <= previous {
            return Err(ValidationError::NonIncreasingTime { joint, kind, index });
        }
        previous = key.time;
    }
    Ok(())
}

/// Offline animation: duration plus one [`JointTrack`] per joint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RawAnimation {
    #[serde(default)]
    pub name: String,
    /// Duration in seconds.
    pub duration: f32,
    #[serde(default)]
    pub tracks: Vec<JointTrack>,
}

impl Default for RawAnimation {
    /// The empty animation: no track, one second long. Always valid.
    fn default() -> Self {
        Self {
            name: String::new(),
            duration: 1.0,
            tracks: Vec::new(),
        }
    }
}

impl RawAnimation {
    /// Checks duration and every track: non-empty, times strictly increasing
    /// and within `[0, duration]`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ValidationError::InvalidDuration(self.duration));
        }
        for (joint, track) in self.tracks.iter().enumerate() {
            track.validate(joint, self.duration)?;
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Number of joint tracks.
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// Total number of keys across all joints and track kinds.
    pub fn num_keys(&self) -> usize {
        self.tracks.iter().map(JointTrack::num_keys).sum()
    }
}

/// Interpolates between two keyframes at `time`.
///
/// Shared by sampling and decimation so both reconstruct identical values.
#[inline]
pub(crate) fn interpolate_keys<V: Interpolate>(
    left: &Keyframe<V>,
    right: &Keyframe<V>,
    time: f32,
) -> V {
    let span = right.time - left.time;
    if span <= 0.0 {
        return left.value;
    }
    let alpha = ((time - left.time) / span).clamp(0.0, 1.0);
    V::interpolate(left.value, right.value, alpha)
}

/// Sample a key sequence at `time` (seconds).
///
/// Times before the first key or after the last key clamp to the boundary
/// value. Returns `None` for an empty sequence.
pub fn sample_keys<V: Interpolate>(keys: &[Keyframe<V>], time: f32) -> Option<V> {
    let first = keys.first()?;
    let last = keys.last()?;
    if keys.len() == 1 || time <= first.time {
        return Some(first.value);
    }
    if time >= last.time {
        return Some(last.value);
    }
    // First key strictly after `time`; its predecessor starts the segment.
    let right = keys.partition_point(|k| k.time <= time);
    Some(interpolate_keys(&keys[right - 1], &keys[right], time))
}
