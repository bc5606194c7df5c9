use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::store::ReferenceCatalog;
use crate::core::reference::ReferenceEntry;
use crate::core::types::{MatchStatus, MatchedField, ReferenceId};
use crate::matching::edit_distance::{EditCosts, EditDistanceScorer};
use crate::matching::fragment::{FragmentParams, FragmentScorer};
use crate::matching::scoring::{round_score, Algorithm, Similarity};
use crate::normalize::NormalizedName;

/// How `best_match` is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BestMatchStyle {
    /// The caller's prefix and suffix around the winning normalized name
    #[default]
    Rewrap,
    /// The winning reference's raw name as listed in the catalog
    Display,
}

/// Configuration for the matching engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub algorithm: Algorithm,
    pub edit_costs: EditCosts,
    pub fragment_params: FragmentParams,
    pub best_match_style: BestMatchStyle,
}

impl MatchingConfig {
    /// Scorer for the configured algorithm
    #[must_use]
    pub fn scorer(&self) -> Box<dyn Similarity> {
        match self.algorithm {
            Algorithm::Levenshtein => Box::new(EditDistanceScorer::new(self.edit_costs)),
            Algorithm::Fragment => Box::new(FragmentScorer::new(self.fragment_params)),
        }
    }
}

/// Best match for one input name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The input exactly as given
    pub input: String,

    /// The matched name, rendered per [`BestMatchStyle`]
    pub best_match: String,

    /// Similarity of the best pick, rounded to two decimals
    pub score: f64,

    pub status: MatchStatus,
}

impl MatchResult {
    /// Result returned when the catalog has no entries
    #[must_use]
    pub fn unmatched(input: &str) -> Self {
        Self {
            input: input.to_string(),
            best_match: String::new(),
            score: 0.0,
            status: MatchStatus::NoMatch,
        }
    }

    /// True for the empty-catalog result
    #[must_use]
    pub fn is_unmatched_sentinel(&self) -> bool {
        self.best_match.is_empty() && self.score == 0.0 && self.status == MatchStatus::NoMatch
    }
}

/// One ranked (entry, field) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: ReferenceId,
    pub field: MatchedField,
    /// Raw catalog name for the field
    pub name: String,
    pub normalized: String,
    pub category: String,
    pub score: f64,
    pub status: MatchStatus,
}

/// The main matching engine
pub struct MatchingEngine<'a> {
    catalog: &'a ReferenceCatalog,
    config: MatchingConfig,
    scorer: Box<dyn Similarity>,
}

impl<'a> MatchingEngine<'a> {
    /// Create a new matching engine with default configuration
    #[must_use]
    pub fn new(catalog: &'a ReferenceCatalog) -> Self {
        Self::with_config(catalog, MatchingConfig::default())
    }

    /// Create a new matching engine with custom configuration
    #[must_use]
    pub fn with_config(catalog: &'a ReferenceCatalog, config: MatchingConfig) -> Self {
        let scorer = config.scorer();
        Self {
            catalog,
            config,
            scorer,
        }
    }

    #[must_use]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &ReferenceCatalog {
        self.catalog
    }

    #[must_use]
    pub fn scorer(&self) -> &dyn Similarity {
        self.scorer.as_ref()
    }

    /// Normalize `input` with the catalog's rules and find its best match
    #[must_use]
    pub fn find_best_match(&self, input: &str) -> MatchResult {
        let query = self.catalog.normalizer().normalize(input);
        self.match_normalized(input, &query)
    }

    /// Best match for an already normalized query
    ///
    /// Entries are scanned in catalog order, generic name before brand name;
    /// the first strictly greatest score wins. Empty names are never candidates,
    /// so only a catalog without any name yields [`MatchResult::unmatched`].
    #[must_use]
    pub fn match_normalized(&self, input: &str, query: &NormalizedName) -> MatchResult {
        let mut best: Option<(f64, &ReferenceEntry, MatchedField)> = None;

        for reference in &self.catalog.references {
            for field in [MatchedField::Generic, MatchedField::Brand] {
                let name = reference.normalized(field);
                if name.is_empty() {
                    continue;
                }
                let score = self.scorer.score(&query.normalized, name);
                if best.map_or(true, |(top, _, _)| score > top) {
                    best = Some((score, reference, field));
                }
            }
        }

        let Some((raw_score, reference, field)) = best else {
            return MatchResult::unmatched(input);
        };

        let score = round_score(raw_score);
        let best_match = match self.config.best_match_style {
            BestMatchStyle::Rewrap => query.rewrap(reference.normalized(field)),
            BestMatchStyle::Display => reference.name(field).to_string(),
        };
        let status = MatchStatus::from_score(score);

        tracing::debug!(
            input,
            normalized = %query.normalized,
            id = %reference.id,
            %field,
            score,
            %status,
            scorer = self.scorer.name(),
            "best match"
        );

        MatchResult {
            input: input.to_string(),
            best_match,
            score,
            status,
        }
    }

    /// Every (entry, field) pair ranked by score, best first
    ///
    /// Ties keep scan order. Entries whose two names normalize identically are
    /// reported once, under the generic field.
    #[must_use]
    pub fn find_candidates(&self, input: &str, limit: usize) -> Vec<Candidate> {
        let query = self.catalog.normalizer().normalize(input);

        let mut scored: Vec<(f64, &ReferenceEntry, MatchedField)> = Vec::new();
        for reference in &self.catalog.references {
            if !reference.normalized_generic.is_empty() {
                scored.push((
                    self.scorer.score(&query.normalized, &reference.normalized_generic),
                    reference,
                    MatchedField::Generic,
                ));
            }
            if !reference.normalized_brand.is_empty()
                && reference.normalized_brand != reference.normalized_generic
            {
                scored.push((
                    self.scorer.score(&query.normalized, &reference.normalized_brand),
                    reference,
                    MatchedField::Brand,
                ));
            }
        }

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(limit)
            .map(|(raw, reference, field)| {
                let score = round_score(raw);
                Candidate {
                    id: reference.id,
                    field,
                    name: reference.name(field).to_string(),
                    normalized: reference.normalized(field).to_string(),
                    category: reference.category.clone(),
                    score,
                    status: MatchStatus::from_score(score),
                }
            })
            .collect()
    }

    /// Match a batch in parallel; results keep input order
    #[must_use]
    pub fn match_all<S: AsRef<str> + Sync>(&self, inputs: &[S]) -> Vec<MatchResult> {
        inputs
            .par_iter()
            .map(|input| self.find_best_match(input.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{NormalizationProfile, Normalizer};

    fn make_test_catalog(rows: &[(&str, &str)]) -> ReferenceCatalog {
        let normalizer = Normalizer::default();
        let entries: Vec<ReferenceEntry> = rows
            .iter()
            .zip(1..)
            .map(|(&(generic, brand), id)| {
                ReferenceEntry::new(ReferenceId(id), generic, brand, "内用薬", &normalizer)
            })
            .collect();
        ReferenceCatalog::from_provider(&entries, NormalizationProfile::Extended)
    }

    fn standard_catalog() -> ReferenceCatalog {
        make_test_catalog(&[
            ("ロキソプロフェンナトリウム水和物", "ロキソニン錠60mg"),
            ("センノシド", "プルゼニド錠12mg"),
            ("ファモチジン", "ガスター錠20mg"),
        ])
    }

    fn with_algorithm(algorithm: Algorithm) -> MatchingConfig {
        MatchingConfig {
            algorithm,
            ..MatchingConfig::default()
        }
    }

    #[test]
    fn test_empty_catalog_sentinel() {
        let catalog = ReferenceCatalog::default();
        let engine = MatchingEngine::new(&catalog);

        let result = engine.find_best_match("ロキソニン錠60mg");
        assert_eq!(
            result,
            MatchResult {
                input: "ロキソニン錠60mg".to_string(),
                best_match: String::new(),
                score: 0.0,
                status: MatchStatus::NoMatch,
            }
        );
        assert!(result.is_unmatched_sentinel());
        assert!(engine.find_candidates("ロキソニン", 5).is_empty());
    }

    #[test]
    fn test_entries_with_an_empty_name_are_not_the_sentinel() {
        let catalog = make_test_catalog(&[("", "プロペト"), ("白色ワセリン", "")]);
        let engine = MatchingEngine::new(&catalog);

        for input in ["アイウ", ""] {
            let result = engine.find_best_match(input);
            assert!(!result.is_unmatched_sentinel(), "{input:?}: {result:?}");
            assert_eq!(result.best_match, "プロペト");
        }

        let candidates = engine.find_candidates("プロペト", 10);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].field, MatchedField::Brand);
        assert_eq!(candidates[1].id, ReferenceId(2));
        assert_eq!(candidates[1].field, MatchedField::Generic);
    }

    #[test]
    fn test_exact_match_rewraps_input_annotations() {
        let catalog = standard_catalog();
        let engine = MatchingEngine::new(&catalog);

        let result = engine.find_best_match("ロキソニン錠60mg（三和）");
        assert_eq!(result.best_match, "ロキソニン錠60mg（三和）");
        assert!((result.score - 1.0).abs() < 1e-9);
        assert_eq!(result.status, MatchStatus::Unmodified);
        assert!(!result.is_unmatched_sentinel());
    }

    #[test]
    fn test_display_style_returns_catalog_name() {
        let catalog = standard_catalog();
        let config = MatchingConfig {
            best_match_style: BestMatchStyle::Display,
            ..MatchingConfig::default()
        };
        let engine = MatchingEngine::with_config(&catalog, config);

        let result = engine.find_best_match("ロキソニン錠60mg（三和）");
        assert_eq!(result.best_match, "ロキソニン錠60mg");
    }

    #[test]
    fn test_ocr_variant_by_algorithm() {
        let catalog = standard_catalog();

        let levenshtein = MatchingEngine::with_config(&catalog, with_algorithm(Algorithm::Levenshtein));
        let result = levenshtein.find_best_match("ブルゼニド錠12mg");
        assert!((result.score - 0.8).abs() < 1e-9);
        assert_eq!(result.status, MatchStatus::Modified);
        assert_eq!(result.best_match, "プルゼニド錠12mg");

        let fragment = MatchingEngine::with_config(&catalog, with_algorithm(Algorithm::Fragment));
        let result = fragment.find_best_match("ブルゼニド錠12mg");
        assert!((result.score - 1.0).abs() < 1e-9);
        assert_eq!(result.status, MatchStatus::Unmodified);
        assert_eq!(fragment.scorer().name(), "fragment");
    }

    #[test]
    fn test_no_match_still_reports_closest() {
        let catalog = standard_catalog();
        let engine = MatchingEngine::new(&catalog);

        let result = engine.find_best_match("アイウエオ");
        assert_eq!(result.status, MatchStatus::NoMatch);
        assert!(!result.best_match.is_empty());
        assert!(!result.is_unmatched_sentinel());
    }

    #[test]
    fn test_first_strictly_greatest_wins() {
        let catalog = make_test_catalog(&[
            ("ファモチジン", "ファモチジン錠20mg「サワイ」"),
            ("ファモチジン", "ガスター錠10mg"),
            ("ファモチジン", "ガスター錠20mg"),
        ]);
        let config = MatchingConfig {
            best_match_style: BestMatchStyle::Display,
            ..MatchingConfig::default()
        };
        let engine = MatchingEngine::with_config(&catalog, config);

        // generic is scanned before brand
        assert_eq!(engine.find_best_match("ファモチジン").best_match, "ファモチジン");
        // earlier entry beats a later one with the same score
        assert_eq!(engine.find_best_match("ガスター").best_match, "ガスター錠10mg");
    }

    #[test]
    fn test_score_is_rounded() {
        let catalog = make_test_catalog(&[("アイウ", "アイウ")]);
        let engine = MatchingEngine::new(&catalog);
        // one substitution over three characters
        let result = engine.find_best_match("アイエ");
        assert!((result.score - 0.67).abs() < 1e-12);
        assert_eq!(result.status, MatchStatus::Modified);
    }

    #[test]
    fn test_find_candidates_ranked_and_deduplicated() {
        let catalog = make_test_catalog(&[
            ("ファモチジン", "ファモチジン錠20mg「サワイ」"),
            ("センノシド", "プルゼニド錠12mg"),
            ("ファモチジン", "ガスター錠20mg"),
        ]);
        let engine = MatchingEngine::new(&catalog);

        let candidates = engine.find_candidates("ファモチジン", 10);
        // entry 1 collapses to one candidate, the other two contribute both fields
        assert_eq!(candidates.len(), 5);
        assert_eq!(candidates[0].id, ReferenceId(1));
        assert_eq!(candidates[0].field, MatchedField::Generic);
        assert_eq!(candidates[1].id, ReferenceId(3));
        assert_eq!(candidates[1].status, MatchStatus::Unmodified);
        assert!(candidates.windows(2).all(|w| w[0].score >= w[1].score));

        assert_eq!(engine.find_candidates("ファモチジン", 2).len(), 2);
    }

    #[test]
    fn test_match_all_preserves_order() {
        let catalog = standard_catalog();
        let engine = MatchingEngine::new(&catalog);

        let inputs = ["ガスター錠20mg", "ロキソニン", "", "センノシド"];
        let results = engine.match_all(&inputs);
        assert_eq!(results.len(), inputs.len());
        for (input, result) in inputs.iter().zip(&results) {
            assert_eq!(&result.input, input);
            assert_eq!(result, &engine.find_best_match(input));
        }
        assert_eq!(results[0].best_match, "ガスター錠20mg");
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: MatchingConfig = serde_json::from_str(r#"{"algorithm": "fragment"}"#).unwrap();
        assert_eq!(config.algorithm, Algorithm::Fragment);
        assert_eq!(config.fragment_params, FragmentParams::default());
        assert_eq!(config.best_match_style, BestMatchStyle::Rewrap);
    }
}
