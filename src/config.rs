//! Configuration for trade parsing and pattern filtering

use serde::{Deserialize, Serialize};

/// Year appended to dates pasted without one ("11/17" becomes "11/17/23").
/// Not derived from the clock.
pub const DEFAULT_FALLBACK_YEAR: &str = "23";

/// Thresholds and parser options for a full analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Minimum number of samples before a bucket counts as a pattern
    pub min_samples: usize,

    /// Win rate (percent) a bucket must strictly exceed to be reported
    pub min_win_rate: f64,

    /// Overall win rate (percent) that must be strictly exceeded before a
    /// strategy recommendation is produced
    pub recommendation_win_rate: f64,

    /// Two-digit year appended to dates that carry no year
    pub fallback_year: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_samples: 3,
            min_win_rate: 60.0,
            recommendation_win_rate: 60.0,
            fallback_year: DEFAULT_FALLBACK_YEAR.to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Looser filters for short pastes (a few dozen rows)
    pub fn exploratory() -> Self {
        Self {
            min_samples: 2,
            min_win_rate: 50.0,
            ..Default::default()
        }
    }

    /// Check whether a bucket with the given sample size and win rate passes
    /// the pattern filter
    pub fn passes_filter(&self, samples: usize, win_rate: f64) -> bool {
        samples >= self.min_samples && win_rate > self.min_win_rate
    }
}
