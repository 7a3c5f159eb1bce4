//! Optimization settings for vizij-animation-offline.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::OptimizeError;

/// Default tolerance: 1mm.
pub const DEFAULT_TOLERANCE: f32 = 1e-3;
/// Default error measurement distance: 10cm.
pub const DEFAULT_DISTANCE: f32 = 1e-1;

/// Error bound of the hierarchical optimizer, in meters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Setting {
    /// The maximum error that an optimization is allowed to generate on a whole
    /// joint hierarchy.
    pub tolerance: f32,
    /// The distance (from the joint) at which error is measured, when larger
    /// than the joint hierarchy. Emulates the effect on skinning.
    pub distance: f32,
}

impl Default for Setting {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            distance: DEFAULT_DISTANCE,
        }
    }
}

impl Setting {
    pub fn new(tolerance: f32, distance: f32) -> Self {
        Self {
            tolerance,
            distance,
        }
    }

    /// Both values must be finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.tolerance.is_finite()
            && self.tolerance >= 0.0
            && self.distance.is_finite()
            && self.distance >= 0.0
    }

    pub(crate) fn validate(&self, joint: Option<usize>) -> Result<(), OptimizeError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(OptimizeError::InvalidSetting {
                joint,
                tolerance: self.tolerance,
                distance: self.distance,
            })
        }
    }
}

/// Per joint override of optimization settings, keyed by joint index.
/// Joints without an entry use the global [`Setting`].
pub type JointsSetting = HashMap<usize, Setting>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_favor_quality() {
        let s = Setting::default();
        assert_eq!(s.tolerance, 1e-3);
        assert_eq!(s.distance, 1e-1);
        assert!(s.is_valid());
    }

    #[test]
    fn rejects_negative_and_nan() {
        assert!(!Setting::new(-1.0, 0.1).is_valid());
        assert!(!Setting::new(1e-3, f32::NAN).is_valid());
        assert!(matches!(
            Setting::new(1e-3, -0.1).validate(Some(4)),
            Err(OptimizeError::InvalidSetting { joint: Some(4), .. })
        ));
    }
}
