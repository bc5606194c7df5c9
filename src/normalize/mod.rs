//! Drug-name normalization.
//!
//! OCR output and master-list entries carry a lot of text that does not
//! identify the drug itself: strengths (`60mg`, `0.5%`), dosage forms (`錠`,
//! `口腔内崩壊錠`, `カプセル`) and maker annotations (`（サワイ）`, `「日医工」`).
//! The [`Normalizer`] strips those tokens and returns the comparable core
//! together with the text it removed around it.
//!
//! ## Passes
//!
//! Removal passes run in a fixed order over an inclusion mask:
//!
//! 1. Number + unit (`10mg`, `2mg/mL`, `100万単位`)
//! 2. Number adjacent to a form word (`錠5`, `5錠`)
//! 3. Bare form words, longest first
//! 4. Bracketed maker annotations
//! 5. Extended profile only: lone `液`, bare numbers, `×`, and remaining symbols
//!
//! Every pass only sees characters no earlier pass removed, lowercased and
//! with whitespace hidden. The passes repeat until a full round removes
//! nothing, so a removal that joins two halves of a form word is caught too.
//!
//! ## Example
//!
//! ```rust
//! use medmatch::normalize::normalize;
//!
//! let name = normalize("ロキソニン錠60mg（三和）");
//! assert_eq!(name.normalized, "ロキソニン");
//! assert_eq!(name.prefix, "");
//! assert_eq!(name.suffix, "錠60mg（三和）");
//! ```

mod mask;
pub mod rules;

use serde::{Deserialize, Serialize};

pub use rules::NormalizationProfile;

use mask::RemovalMask;
use rules::{fold_case, fold_symbol, fold_width};

/// A normalized drug name and the text stripped around it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedName {
    /// Lowercased, whitespace-free core used for matching
    pub normalized: String,

    /// Input text before the core span
    pub prefix: String,

    /// Input text after the core span
    pub suffix: String,

    /// The core span as it appeared in the input, including anything removed
    /// inside it
    #[serde(skip)]
    pub core: String,
}

impl NormalizedName {
    /// True when the input was empty or whitespace only
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Place `name` between the stripped prefix and suffix
    #[must_use]
    pub fn rewrap(&self, name: &str) -> String {
        format!("{}{name}{}", self.prefix, self.suffix)
    }

    fn fallback(trimmed: &str) -> Self {
        Self {
            normalized: trimmed.chars().map(|c| fold_case(fold_width(c))).collect(),
            prefix: String::new(),
            suffix: String::new(),
            core: trimmed.to_string(),
        }
    }
}

/// Normalizer for one rule profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    profile: NormalizationProfile,
}

impl Normalizer {
    #[must_use]
    pub fn new(profile: NormalizationProfile) -> Self {
        Self { profile }
    }

    #[must_use]
    pub fn profile(&self) -> NormalizationProfile {
        self.profile
    }

    /// Normalize a raw drug name. Never fails: empty input gives an empty
    /// result, and input that would be stripped entirely falls back to its
    /// width-folded lowercase form.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> NormalizedName {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return NormalizedName::default();
        }

        // Folding maps one char to one char, so mask indices address `original` too
        let original: Vec<char> = trimmed.chars().collect();
        let prepared: Vec<char> = original
            .iter()
            .map(|&c| fold_case(fold_symbol(fold_width(c))))
            .collect();

        let mut mask = RemovalMask::new(prepared);
        mask.apply_until_stable(self.profile.rules());

        let Some((first, last)) = mask.core_span() else {
            return NormalizedName::fallback(trimmed);
        };

        let normalized = mask.kept_text();
        if normalized.is_empty() {
            return NormalizedName::fallback(trimmed);
        }

        NormalizedName {
            normalized,
            prefix: original[..first].iter().collect(),
            suffix: original[last + 1..].iter().collect(),
            core: original[first..=last].iter().collect(),
        }
    }
}

/// Normalize with the default (extended) profile
#[must_use]
pub fn normalize(raw: &str) -> NormalizedName {
    Normalizer::default().normalize(raw)
}
