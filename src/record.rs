use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;

/// Snapshot of one completed session, created once when the countdown expires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    wpm: u32,
    accuracy: u32,
    duration_secs: u32,
    total_chars: usize,
    correct_chars: usize,
    completed_at: DateTime<Local>,
}

impl ResultRecord {
    pub fn new(
        metrics: Metrics,
        duration_secs: u32,
        total_chars: usize,
        correct_chars: usize,
        completed_at: DateTime<Local>,
    ) -> Self {
        Self {
            wpm: metrics.wpm,
            accuracy: metrics.accuracy,
            duration_secs,
            total_chars,
            correct_chars,
            completed_at,
        }
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn accuracy(&self) -> u32 {
        self.accuracy
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            wpm: self.wpm,
            accuracy: self.accuracy,
        }
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    pub fn correct_chars(&self) -> usize {
        self.correct_chars
    }

    pub fn completed_at(&self) -> DateTime<Local> {
        self.completed_at
    }
}
