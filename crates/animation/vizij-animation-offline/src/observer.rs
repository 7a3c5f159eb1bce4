//! Optional progress sink for the hierarchical optimizer.
//!
//! The optimizer pushes one [`ObserverData`] record per attempted key removal.
//! Returning `false` from [`Observer::push`] stops decimation of the current
//! track; the track keeps its last validated keys and the remaining tracks are
//! still optimized.

use serde::{Deserialize, Serialize};

use crate::raw_animation::TrackKind;

/// Snapshot of one decimation step.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ObserverData {
    /// Iteration number within the track, starting at 0.
    pub iteration: usize,
    pub joint: usize,
    #[serde(rename = "type")]
    pub kind: TrackKind,
    /// Resolved hierarchical tolerance of the joint.
    pub target_error: f32,
    /// Distance at which error is measured.
    pub distance: f32,
    pub original_size: usize,
    /// Track size before this candidate.
    pub validated_size: usize,
    /// Track size if the candidate is accepted.
    pub candidate_size: usize,
    /// Bound the candidate's error is checked against.
    pub own_tolerance: f32,
    /// Error the candidate introduces.
    pub own_error: f32,
    /// Share of `target_error` granted to each track of the joint.
    pub hierarchy_error_ratio: f32,
    /// Key count reduction the candidate achieves, relative to the original size.
    pub optimization_delta: f32,
}

pub trait Observer {
    /// Receives a step record. Return `false` to stop optimizing the current track.
    fn push(&mut self, data: &ObserverData) -> bool;
}

impl<F> Observer for F
where
    F: FnMut(&ObserverData) -> bool,
{
    fn push(&mut self, data: &ObserverData) -> bool {
        self(data)
    }
}

/// Records every step and never cancels.
impl Observer for Vec<ObserverData> {
    fn push(&mut self, data: &ObserverData) -> bool {
        Vec::push(self, *data);
        true
    }
}
