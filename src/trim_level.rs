//! Memory pressure levels as reported by the host runtime.
//!
//! The numeric values follow the usual mobile runtime convention, so hosts can forward the raw integer through
//! [TrimLevel::try_from].
use std::convert::TryFrom;

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum TrimLevelError {
    #[error("unknown memory trim level {0}")]
    Unknown(i32),
}

/// Ordered from least to most severe.
///
/// `UiHidden` sorts above the running levels but only means the app went to the background.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TrimLevel {
    RunningModerate = 5,
    RunningLow = 10,
    RunningCritical = 15,
    UiHidden = 20,
    Background = 40,
    Moderate = 60,
    Complete = 80,
}

impl TrimLevel {
    /// Whether this level means the device is actually short on memory, as opposed to the UI just going away.
    pub fn requires_sweep(self) -> bool {
        self >= TrimLevel::RunningLow && self != TrimLevel::UiHidden
    }

    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for TrimLevel {
    type Error = TrimLevelError;

    fn try_from(raw: i32) -> Result<TrimLevel, TrimLevelError> {
        use TrimLevel::*;

        Ok(match raw {
            5 => RunningModerate,
            10 => RunningLow,
            15 => RunningCritical,
            20 => UiHidden,
            40 => Background,
            60 => Moderate,
            80 => Complete,
            x => return Err(TrimLevelError::Unknown(x)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_sweep() {
        use TrimLevel::*;

        assert!(!RunningModerate.requires_sweep());
        assert!(RunningLow.requires_sweep());
        assert!(RunningCritical.requires_sweep());
        // Backgrounding alone isn't pressure.
        assert!(!UiHidden.requires_sweep());
        assert!(Background.requires_sweep());
        assert!(Moderate.requires_sweep());
        assert!(Complete.requires_sweep());
    }

    #[test]
    fn test_raw_conversion() {
        for level in &[
            TrimLevel::RunningModerate,
            TrimLevel::RunningLow,
            TrimLevel::RunningCritical,
            TrimLevel::UiHidden,
            TrimLevel::Background,
            TrimLevel::Moderate,
            TrimLevel::Complete,
        ] {
            assert_eq!(TrimLevel::try_from(level.as_raw()), Ok(*level));
        }

        assert_eq!(TrimLevel::try_from(7), Err(TrimLevelError::Unknown(7)));
        assert_eq!(
            TrimLevelError::Unknown(-1).to_string(),
            "unknown memory trim level -1"
        );
    }
}
