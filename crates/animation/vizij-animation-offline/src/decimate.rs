//! Per-track keyframe decimation.
//!
//! Greedy least-effect removal: every interior key is a removal candidate whose
//! cost is the worst error introduced on the original samples it spans once
//! the track is reconstructed by interpolating its remaining neighbors.
//! Candidates sit in a min-heap; the cheapest one is removed while its cost
//! fits the joint's own tolerance, then only its two neighbors are re-costed.
//! The first and last keys are never candidates.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::hierarchy::JointSpec;
use crate::math::{angle_between_quat, distance_float3, Float3, Interpolate, Quaternion};
use crate::observer::{Observer, ObserverData};
use crate::raw_animation::{interpolate_keys, Keyframe, TrackKind};

/// Converts the difference between a reconstructed and an original value into
/// a positional error, in meters.
pub trait ErrorAdapter {
    type Value: Interpolate;
    const KIND: TrackKind;

    fn error(&self, reconstructed: Self::Value, original: Self::Value) -> f32;
}

/// Translation offsets, scaled by the parent's accumulated scale.
#[derive(Clone, Copy, Debug)]
pub struct TranslationAdapter {
    pub scale: f32,
}

impl TranslationAdapter {
    pub fn from_spec(spec: &JointSpec) -> Self {
        Self {
            scale: spec.parent_scale,
        }
    }
}

impl ErrorAdapter for TranslationAdapter {
    type Value = Float3;
    const KIND: TrackKind = TrackKind::Translation;

    #[inline]
    fn error(&self, reconstructed: Float3, original: Float3) -> f32 {
        distance_float3(reconstructed, original) * self.scale
    }
}

/// Angular deviation as an arc length at `radius`.
#[derive(Clone, Copy, Debug)]
pub struct RotationAdapter {
    pub radius: f32,
}

impl RotationAdapter {
    pub fn from_spec(spec: &JointSpec) -> Self {
        Self {
            radius: spec.distance,
        }
    }
}

impl ErrorAdapter for RotationAdapter {
    type Value = Quaternion;
    const KIND: TrackKind = TrackKind::Rotation;

    #[inline]
    fn error(&self, reconstructed: Quaternion, original: Quaternion) -> f32 {
        angle_between_quat(reconstructed, original) * self.radius
    }
}

/// Scale deviation as the displacement of a point at `radius`.
#[derive(Clone, Copy, Debug)]
pub struct ScaleAdapter {
    pub radius: f32,
}

impl ScaleAdapter {
    /// The joint's own scale multiplies the hierarchy it resizes, so the
    /// radius is the hierarchy length taken before that scale.
    pub fn from_spec(spec: &JointSpec) -> Self {
        let radius = if spec.scale > 0.0 {
            spec.distance * spec.parent_scale / spec.scale
        } else {
            spec.distance
        };
        Self { radius }
    }
}

impl ErrorAdapter for ScaleAdapter {
    type Value = Float3;
    const KIND: TrackKind = TrackKind::Scale;

    #[inline]
    fn error(&self, reconstructed: Float3, original: Float3) -> f32 {
        distance_float3(reconstructed, original) * self.radius
    }
}

/// Outcome of decimating one track.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackDecimation<V> {
    pub keys: Vec<Keyframe<V>>,
    /// Removal attempts, i.e. observer records pushed.
    pub iterations: usize,
    /// The observer stopped this track early.
    pub cancelled: bool,
}

/// A key removal candidate in the priority queue.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    error: f32,
    time: f32,
    index: usize,
    generation: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior: smallest error first, then earliest key.
        other
            .error
            .total_cmp(&self.error)
            .then_with(|| other.time.total_cmp(&self.time))
    }
}

/// Worst error over the original samples strictly between `left` and `right`
/// when reconstructed from those two keys. NaN wins so it can never be accepted.
fn span_error<A: ErrorAdapter>(
    keys: &[Keyframe<A::Value>],
    left: usize,
    right: usize,
    adapter: &A,
) -> f32 {
    let (l, r) = (&keys[left], &keys[right]);
    keys[left + 1..right]
        .iter()
        .map(|k| adapter.error(interpolate_keys(l, r, k.time), k.value))
        .fold(0.0f32, |acc, e| if e.is_nan() || e > acc { e } else { acc })
}

/// Decimate `keys` within `spec.own_tolerance()`.
///
/// `keys` must satisfy the track invariants (strictly increasing times). The
/// observer, if any, receives one record per attempted removal.
pub fn decimate_track<A: ErrorAdapter>(
    keys: &[Keyframe<A::Value>],
    adapter: &A,
    joint: usize,
    spec: &JointSpec,
    mut observer: Option<&mut (dyn Observer + '_)>,
) -> TrackDecimation<A::Value> {
    let original_size = keys.len();
    if original_size <= 2 {
        return TrackDecimation {
            keys: keys.to_vec(),
            iterations: 0,
            cancelled: false,
        };
    }

    let last = original_size - 1;
    let own_tolerance = spec.own_tolerance();

    // Doubly linked list over surviving keys.
    let mut prev: Vec<usize> = (0..original_size).map(|i| i.saturating_sub(1)).collect();
    let mut next: Vec<usize> = (0..original_size).map(|i| (i + 1).min(last)).collect();
    let mut alive = vec![true; original_size];
    let mut generations = vec![0u32; original_size];

    let mut heap: BinaryHeap<Candidate> = (1..last)
        .map(|index| Candidate {
            error: span_error(keys, index - 1, index + 1, adapter),
            time: keys[index].time,
            index,
            generation: 0,
        })
        .collect();

    let mut validated_size = original_size;
    let mut iterations = 0;
    let mut cancelled = false;

    while let Some(candidate) = heap.pop() {
        let index = candidate.index;
        if !alive[index] || generations[index] != candidate.generation {
            continue;
        }

        let candidate_size = validated_size - 1;
        let data = ObserverData {
            iteration: iterations,
            joint,
            kind: A::KIND,
            target_error: spec.tolerance,
            distance: spec.distance,
            original_size,
            validated_size,
            candidate_size,
            own_tolerance,
            own_error: candidate.error,
            hierarchy_error_ratio: spec.hierarchy_error_ratio,
            optimization_delta: (original_size - candidate_size) as f32 / original_size as f32,
        };
        iterations += 1;

        if let Some(observer) = observer.as_deref_mut() {
            if !observer.push(&data) {
                cancelled = true;
                break;
            }
        }

        // Cheapest candidate does not fit: fixed point reached.
        if candidate.error.is_nan() || candidate.error > own_tolerance {
            break;
        }

        let (left, right) = (prev[index], next[index]);
        alive[index] = false;
        next[left] = right;
        prev[right] = left;
        validated_size = candidate_size;

        for neighbor in [left, right] {
            if neighbor == 0 || neighbor == last {
                continue;
            }
            generations[neighbor] += 1;
            heap.push(Candidate {
                error: span_error(keys, prev[neighbor], next[neighbor], adapter),
                time: keys[neighbor].time,
                index: neighbor,
                generation: generations[neighbor],
            });
        }
    }

    let kept = keys
        .iter()
        .zip(&alive)
        .filter_map(|(key, &alive)| alive.then_some(*key))
        .collect();

    TrackDecimation {
        keys: kept,
        iterations,
        cancelled,
    }
}
