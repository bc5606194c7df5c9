//! Similarity scorers and the matching engine.
//!
//! - [`MatchingEngine`]: scans a [`ReferenceCatalog`] with one scorer and
//!   classifies the best hit
//! - [`EditDistanceScorer`]: weighted Levenshtein distance, normalized by the
//!   longer string
//! - [`FragmentScorer`]: common-fragment coverage with diacritic and
//!   look-alike bridging
//!
//! Both scorers implement [`Similarity`], selected by [`Algorithm`].
//!
//! ## Classification
//!
//! | Score (rounded) | Status |
//! |-----------------|--------|
//! | `>= 0.85`       | `unmodified` |
//! | `>= 0.5`        | `modified` |
//! | otherwise       | `no_match` |
//!
//! ## Example
//!
//! ```rust
//! use medmatch::{MatchingEngine, MatchStatus, NormalizationProfile, ReferenceCatalog};
//!
//! let catalog = ReferenceCatalog::load_embedded(NormalizationProfile::Extended).unwrap();
//! let engine = MatchingEngine::new(&catalog);
//!
//! let result = engine.find_best_match("ロキソニン錠60mg");
//! assert_eq!(result.status, MatchStatus::Unmodified);
//! assert_eq!(result.best_match, "ロキソニン錠60mg");
//! ```
//!
//! [`ReferenceCatalog`]: crate::catalog::store::ReferenceCatalog

pub mod edit_distance;
pub mod engine;
pub mod equivalence;
pub mod fragment;
pub mod scoring;
pub mod segments;

pub use edit_distance::{EditCosts, EditDistanceScorer};
pub use engine::{BestMatchStyle, Candidate, MatchResult, MatchingConfig, MatchingEngine};
pub use fragment::{Fragment, FragmentParams, FragmentScorer};
pub use scoring::{Algorithm, Similarity};
