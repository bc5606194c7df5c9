//! # medmatch
//!
//! A library for matching OCR-read Japanese drug names against a reference
//! drug master list.
//!
//! Prescription OCR output is noisy: voiced marks are lost or added (`ブ` for
//! `プ`), look-alike katakana are swapped (`ワ` for `ジ`), and brand names come
//! wrapped in strengths, dosage forms and maker annotations that the master
//! list may spell differently.
//!
//! `medmatch` handles both problems:
//!
//! - **Normalization**: strips dosage, form and maker tokens, keeping what was
//!   stripped so results can be re-wrapped in the caller's own annotations
//! - **Edit distance**: weighted Levenshtein similarity
//! - **Fragment scoring**: shared-fragment coverage that treats voicing
//!   differences as matches and bridges look-alike characters
//! - **Classification**: `unmodified`, `modified` or `no_match` from fixed
//!   score thresholds
//!
//! ## Example
//!
//! ```rust
//! use medmatch::{MatchingConfig, MatchingEngine, MatchStatus, NormalizationProfile, ReferenceCatalog};
//! use medmatch::matching::Algorithm;
//!
//! let catalog = ReferenceCatalog::load_embedded(NormalizationProfile::Extended).unwrap();
//!
//! let config = MatchingConfig {
//!     algorithm: Algorithm::Fragment,
//!     ..MatchingConfig::default()
//! };
//! let engine = MatchingEngine::with_config(&catalog, config);
//!
//! let result = engine.find_best_match("ブルゼニド錠12mg");
//! assert_eq!(result.best_match, "プルゼニド錠12mg");
//! assert_eq!(result.status, MatchStatus::Unmodified);
//! ```
//!
//! ## Modules
//!
//! - [`normalize`]: Drug-name normalization rules and profiles
//! - [`matching`]: Scorers, matching engine and segment matching
//! - [`catalog`]: Reference catalog storage and master-sheet import
//! - [`core`]: Core data types for entries and results
//! - [`parsing`]: Parsers for master sheets and name lists
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: JSON HTTP API

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod normalize;
pub mod parsing;
pub mod utils;
pub mod web;

// Re-export commonly used types for convenience
pub use catalog::store::{ReferenceCatalog, ReferenceProvider};
pub use core::reference::ReferenceEntry;
pub use core::types::*;
pub use matching::engine::{MatchResult, MatchingConfig, MatchingEngine};
pub use normalize::{normalize, NormalizationProfile, NormalizedName, Normalizer};
