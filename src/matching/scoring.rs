use serde::{Deserialize, Serialize};

use crate::core::types::MatchStatus;

/// Score at or above which a match is considered the same drug as written
pub const THRESHOLD_UNMODIFIED: f64 = 0.85;

/// Score at or above which a match is considered an OCR-corrupted variant
pub const THRESHOLD_MODIFIED: f64 = 0.5;

/// Safely convert usize to f64 for length ratios
///
/// Drug names are short, so the precision loss of the cast never matters here.
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// A similarity measure between a normalized query and a normalized reference name.
///
/// Implementations must be pure: the same pair always yields the same score.
pub trait Similarity: Send + Sync {
    /// Short identifier used in output
    fn name(&self) -> &'static str;

    /// Similarity of `query` to `candidate`, 1.0 meaning identical
    fn score(&self, query: &str, candidate: &str) -> f64;
}

/// Which scorer the matching engine uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Normalized weighted edit distance
    #[default]
    Levenshtein,
    /// Fragment pattern similarity with diacritic and look-alike bridging
    Fragment,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Levenshtein => write!(f, "levenshtein"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Round to two decimal places, the precision reported to callers
#[must_use]
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

impl MatchStatus {
    /// Classify a (rounded) score against the fixed thresholds
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= THRESHOLD_UNMODIFIED {
            Self::Unmodified
        } else if score >= THRESHOLD_MODIFIED {
            Self::Modified
        } else {
            Self::NoMatch
        }
    }
}
