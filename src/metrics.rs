use serde::{Deserialize, Serialize};

/// Characters per word in the standard wpm convention
pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub wpm: u32,
    pub accuracy: u32,
}

/// Words per minute from correct characters and accuracy as a whole percent.
///
/// A zero duration reports 0 wpm, and accuracy is 0 when nothing was typed.
pub fn compute(correct_chars: usize, total_chars: usize, duration_secs: u32) -> Metrics {
    debug_assert!(correct_chars <= total_chars);

    let wpm = if duration_secs == 0 {
        0
    } else {
        let minutes = f64::from(duration_secs) / 60.0;
        ((correct_chars as f64 / CHARS_PER_WORD) / minutes).round() as u32
    };

    let accuracy = if total_chars > 0 {
        ((correct_chars as f64 / total_chars as f64) * 100.0).round() as u32
    } else {
        0
    };

    Metrics { wpm, accuracy }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum WpmRating {
    Excellent,
    Good,
    Average,
    #[strum(serialize = "Needs Practice")]
    NeedsPractice,
}

impl WpmRating {
    pub fn of(wpm: u32) -> Self {
        match wpm {
            70.. => Self::Excellent,
            50..=69 => Self::Good,
            30..=49 => Self::Average,
            _ => Self::NeedsPractice,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AccuracyRating {
    Excellent,
    Good,
    Fair,
    #[strum(serialize = "Needs Work")]
    NeedsWork,
}

impl AccuracyRating {
    pub fn of(accuracy: u32) -> Self {
        match accuracy {
            95.. => Self::Excellent,
            90..=94 => Self::Good,
            80..=89 => Self::Fair,
            _ => Self::NeedsWork,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_reference_values() {
        assert_eq!(
            compute(25, 30, 30),
            Metrics {
                wpm: 10,
                accuracy: 83
            }
        );
    }

    #[test]
    fn test_compute_nothing_typed() {
        assert_eq!(compute(0, 0, 60), Metrics::default());
    }

    #[test]
    fn test_compute_zero_duration() {
        assert_eq!(compute(10, 10, 0).wpm, 0);
        assert_eq!(compute(10, 10, 0).accuracy, 100);
    }

    #[test]
    fn test_compute_rounding() {
        // 203 / 5 = 40.6 words in one minute
        assert_eq!(compute(203, 203, 60).wpm, 41);
        // 2 / 3 = 66.67%
        assert_eq!(compute(2, 3, 60).accuracy, 67);
        // 1 / 8 = 12.5% rounds half up
        assert_eq!(compute(1, 8, 60).accuracy, 13);
    }

    #[test]
    fn test_compute_longer_test() {
        // 600 correct chars over two minutes is 60 wpm
        let m = compute(600, 640, 120);
        assert_eq!(m.wpm, 60);
        assert_eq!(m.accuracy, 94);
    }

    #[test]
    fn test_wpm_rating() {
        assert_eq!(WpmRating::of(85), WpmRating::Excellent);
        assert_eq!(WpmRating::of(70), WpmRating::Excellent);
        assert_eq!(WpmRating::of(50), WpmRating::Good);
        assert_eq!(WpmRating::of(30), WpmRating::Average);
        assert_eq!(WpmRating::of(0), WpmRating::NeedsPractice);
        assert_eq!(WpmRating::NeedsPractice.to_string(), "Needs Practice");
    }

    #[test]
    fn test_accuracy_rating() {
        assert_eq!(AccuracyRating::of(100), AccuracyRating::Excellent);
        assert_eq!(AccuracyRating::of(92), AccuracyRating::Good);
        assert_eq!(AccuracyRating::of(80), AccuracyRating::Fair);
        assert_eq!(AccuracyRating::of(79), AccuracyRating::NeedsWork);
        assert_eq!(AccuracyRating::NeedsWork.to_string(), "Needs Work");
    }
}
