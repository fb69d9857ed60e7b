//! Latency classification against a soft and a hard budget.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::LatencyConfig;

/// Pass/fail verdict of a latency measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LatencyStatus {
    Pass,
    Fail,
}

impl LatencyStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for LatencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of one measured latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyResult {
    pub latency_ms: u64,
    /// Within the soft ("acceptable") budget
    pub is_acceptable: bool,
    /// Within the hard ("maximum") budget
    pub within_threshold: bool,
}

impl LatencyResult {
    pub const fn status(&self) -> LatencyStatus {
        if self.within_threshold {
            LatencyStatus::Pass
        } else {
            LatencyStatus::Fail
        }
    }

    /// Passed the hard budget but missed the soft one
    pub const fn is_degraded(&self) -> bool {
        self.within_threshold && !self.is_acceptable
    }
}

/// Classify `latency_ms` against both budgets. Both comparisons are inclusive.
pub const fn classify(latency_ms: u64, acceptable_ms: u64, maximum_ms: u64) -> LatencyResult {
    LatencyResult {
        latency_ms,
        is_acceptable: latency_ms <= acceptable_ms,
        within_threshold: latency_ms <= maximum_ms,
    }
}

/// [`classify`] bound to configured thresholds
#[derive(Debug, Clone, Copy)]
pub struct LatencyClassifier {
    acceptable_ms: u64,
    maximum_ms: u64,
    simple_query_ms: u64,
}

impl LatencyClassifier {
    pub const fn new(acceptable_ms: u64, maximum_ms: u64, simple_query_ms: u64) -> Self {
        Self {
            acceptable_ms,
            maximum_ms,
            simple_query_ms,
        }
    }

    pub const fn from_config(config: &LatencyConfig) -> Self {
        Self::new(config.acceptable, config.maximum, config.simple_query)
    }

    pub const fn classify(&self, latency_ms: u64) -> LatencyResult {
        classify(latency_ms, self.acceptable_ms, self.maximum_ms)
    }

    /// Whether a trivial query met its tighter budget
    pub const fn simple_query_ok(&self, latency_ms: u64) -> bool {
        latency_ms <= self.simple_query_ms
    }

    pub const fn acceptable_ms(&self) -> u64 {
        self.acceptable_ms
    }

    pub const fn maximum_ms(&self) -> u64 {
        self.maximum_ms
    }

    pub const fn simple_query_ms(&self) -> u64 {
        self.simple_query_ms
    }
}

/// Aggregate over a series of latency samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub count: usize,
    pub min_ms: u64,
    pub max_ms: u64,
    pub mean_ms: f64,
}

impl LatencySummary {
    /// `None` when there are no samples
    #[allow(clippy::cast_precision_loss)]
    pub fn from_samples(samples: &[u64]) -> Option<Self> {
        let min_ms = *samples.iter().min()?;
        let max_ms = *samples.iter().max()?;
        let total: u128 = samples.iter().map(|&s| u128::from(s)).sum();

        Some(Self {
            count: samples.len(),
            min_ms,
            max_ms,
            mean_ms: total as f64 / samples.len() as f64,
        })
    }
}
