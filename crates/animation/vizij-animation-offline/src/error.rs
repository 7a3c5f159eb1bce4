//! Error types for the offline optimizers.

use thiserror::Error;

use crate::raw_animation::ValidationError;

/// Reasons an optimizer run fails. The output animation is always reset to the
/// empty animation when one of these is returned.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("invalid optimization setting (joint {joint:?}): tolerance={tolerance}, distance={distance}")]
    InvalidSetting {
        joint: Option<usize>,
        tolerance: f32,
        distance: f32,
    },
    #[error("invalid constant tolerance for {what}: {value}")]
    InvalidTolerance { what: &'static str, value: f32 },
    #[error("invalid input animation: {0}")]
    InvalidInput(#[source] ValidationError),
    #[error("animation has {animation} joint tracks but skeleton has {skeleton} joints")]
    JointCountMismatch { animation: usize, skeleton: usize },
    #[error("optimized animation failed validation: {0}")]
    InvalidOutput(#[source] ValidationError),
    #[error("optimizer config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for optimizer operations.
pub type OptimizeResult<T> = std::result::Result<T, OptimizeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_animation::TrackKind;

    #[test]
    fn error_display() {
        let err = OptimizeError::JointCountMismatch {
            animation: 2,
            skeleton: 3,
        };
        assert_eq!(
            format!("{err}"),
            "animation has 2 joint tracks but skeleton has 3 joints"
        );

        let err = OptimizeError::InvalidInput(ValidationError::EmptyTrack {
            joint: 1,
            kind: TrackKind::Rotation,
        });
        assert!(format!("{err}").contains("joint 1 rotation track"));
    }
}
