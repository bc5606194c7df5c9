use serde::{Deserialize, Serialize};

use super::scoring::{count_to_f64, Similarity};

/// Per-operation costs for the weighted edit distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditCosts {
    pub insert: f64,
    pub delete: f64,
    pub replace: f64,
}

impl Default for EditCosts {
    fn default() -> Self {
        Self {
            insert: 1.0,
            delete: 1.0,
            replace: 1.0,
        }
    }
}

/// Weighted Levenshtein distance (Wagner–Fischer, two rolling rows).
///
/// Operates on Unicode scalar values, so one kana counts as one edit.
#[must_use]
pub fn distance(a: &str, b: &str, costs: &EditCosts) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return count_to_f64(b.len()) * costs.insert;
    }
    if b.is_empty() {
        return count_to_f64(a.len()) * costs.delete;
    }

    let mut prev: Vec<f64> = (0..=b.len()).map(|j| count_to_f64(j) * costs.insert).collect();
    let mut curr = vec![0.0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = count_to_f64(i + 1) * costs.delete;
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j]
            } else {
                (prev[j + 1] + costs.delete)
                    .min(curr[j] + costs.insert)
                    .min(prev[j] + costs.replace)
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `1 - distance / max(|a|, |b|)`, clamped to `[0, 1]`; 1.0 for two empty strings
#[must_use]
pub fn normalized_score(a: &str, b: &str, costs: &EditCosts) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    (1.0 - distance(a, b, costs) / count_to_f64(max_len)).clamp(0.0, 1.0)
}

/// Edit-distance similarity scorer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EditDistanceScorer {
    pub costs: EditCosts,
}

impl EditDistanceScorer {
    #[must_use]
    pub fn new(costs: EditCosts) -> Self {
        Self { costs }
    }

    #[must_use]
    pub fn distance(&self, a: &str, b: &str) -> f64 {
        distance(a, b, &self.costs)
    }
}

impl Similarity for EditDistanceScorer {
    fn name(&self) -> &'static str {
        "levenshtein"
    }

    fn score(&self, query: &str, candidate: &str) -> f64 {
        normalized_score(query, candidate, &self.costs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(a: &str, b: &str) -> f64 {
        distance(a, b, &EditCosts::default())
    }

    fn s(a: &str, b: &str) -> f64 {
        normalized_score(a, b, &EditCosts::default())
    }

    #[test]
    fn test_distance_classic() {
        assert!((d("kitten", "sitting") - 3.0).abs() < 1e-9);
        assert!((d("flaw", "lawn") - 2.0).abs() < 1e-9);
        assert!((d("ロキソニン", "ロキソニン") - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_empty() {
        assert!((d("", "abc") - 3.0).abs() < 1e-9);
        assert!((d("abc", "") - 3.0).abs() < 1e-9);
        assert!((d("", "") - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_counts_chars_not_bytes() {
        // one kana substitution, even though each kana is 3 bytes
        assert!((d("デバケン", "デパケン") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_costs() {
        let costs = EditCosts {
            insert: 2.0,
            delete: 1.0,
            replace: 5.0,
        };
        assert!((distance("", "ab", &costs) - 4.0).abs() < 1e-9);
        assert!((distance("ab", "", &costs) - 2.0).abs() < 1e-9);
        // delete + insert (3.0) beats a replace (5.0)
        assert!((distance("a", "b", &costs) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_score() {
        assert!((s("", "") - 1.0).abs() < 1e-9);
        assert!((s("abc", "abc") - 1.0).abs() < 1e-9);
        assert!((s("abc", "") - 0.0).abs() < 1e-9);
        assert!((s("デバケン", "デパケン") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_scorer_trait() {
        let scorer = EditDistanceScorer::default();
        assert_eq!(scorer.name(), "levenshtein");
        assert!((scorer.score("ブルゼニド", "プルゼニド") - 0.8).abs() < 1e-9);
        assert!((scorer.distance("ab", "ba") - 2.0).abs() < 1e-9);
    }
}
