//! Matching for OCR lines that an external segmenter has already split into
//! labelled chunks.
//!
//! Only `drug` segments are matched. A line whose segments do not concatenate
//! back to the line text is treated as a single `other` segment, so a bad
//! segmentation never produces a match.

use serde::{Deserialize, Serialize};

use crate::core::types::MatchStatus;
use crate::matching::engine::{MatchResult, MatchingEngine};

/// Segment label assigned by the segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentLabel {
    Drug,
    Dosage,
    Usage,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub value: String,
    pub label: SegmentLabel,
}

/// One recognised line with its OCR confidence and segmentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl OcrLine {
    /// Segments if they reproduce the line text, otherwise the whole line as `other`
    #[must_use]
    pub fn checked_segments(&self) -> Vec<Segment> {
        let concatenated: String = self.segments.iter().map(|s| s.value.as_str()).collect();
        if !self.segments.is_empty() && concatenated == self.text {
            return self.segments.clone();
        }
        if !self.segments.is_empty() {
            tracing::warn!(
                text = %self.text,
                segments = %concatenated,
                "segments do not reproduce line text, ignoring segmentation"
            );
        }
        vec![Segment {
            value: self.text.clone(),
            label: SegmentLabel::Other,
        }]
    }
}

/// A drug segment's match, normalization and provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMatch {
    pub input: String,
    pub best_match: String,
    pub score: f64,
    pub status: MatchStatus,
    pub normalized: String,
    pub prefix: String,
    pub suffix: String,
    /// OCR confidence of the source line
    pub confidence: f64,
    /// 0-based index of the source line
    pub source_line: usize,
}

/// Match every `drug` segment, in line order then segment order
#[must_use]
pub fn match_segments(engine: &MatchingEngine<'_>, lines: &[OcrLine]) -> Vec<SegmentMatch> {
    let normalizer = engine.catalog().normalizer();
    let mut matches = Vec::new();

    for (source_line, line) in lines.iter().enumerate() {
        for segment in line.checked_segments() {
            if segment.label != SegmentLabel::Drug {
                continue;
            }
            let name = normalizer.normalize(&segment.value);
            let MatchResult {
                input,
                best_match,
                score,
                status,
            } = engine.match_normalized(&segment.value, &name);

            matches.push(SegmentMatch {
                input,
                best_match,
                score,
                status,
                normalized: name.normalized,
                prefix: name.prefix,
                suffix: name.suffix,
                confidence: line.confidence,
                source_line,
            });
        }
    }

    tracing::debug!(lines = lines.len(), drugs = matches.len(), "segments matched");
    matches
}
