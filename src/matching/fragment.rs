//! Fragment pattern similarity.
//!
//! Two strings are compared by the set of non-overlapping common fragments
//! they share. Characters match under [`compare_chars`]: a voiced/unvoiced
//! difference counts as a full match, and an OCR look-alike pair may bridge a
//! fragment without adding to its length (unless `c > 0`).
//!
//! Each fragment contributes `max(0, (effective_len - b) * coeff)`, where the
//! coefficient is 1.0 for fragments touching either string's start or end and
//! `a` for interior ones. The total is divided by the mean length of the two
//! strings.
//!
//! The fragment set is chosen by exhaustive search over start positions with
//! memoisation on the pair of used-position bitsets. Long inputs, and pairs
//! whose search evaluates more than [`MAX_SEARCH_STEPS`] candidate fragments,
//! fall back to greedy selection of the best single fragment.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::equivalence::{compare_chars, CharMatch};
use super::scoring::{count_to_f64, Similarity};

/// Longest input, in characters, that is searched exhaustively
pub const MAX_EXHAUSTIVE_CHARS: usize = 64;

/// Candidate fragments the exhaustive search may evaluate before the pair is
/// scored greedily instead
pub const MAX_SEARCH_STEPS: usize = 20_000;

/// Tuning parameters for fragment scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FragmentParams {
    /// Position coefficient for interior fragments (boundary fragments get 1.0)
    pub a: f64,
    /// Length discount applied to every fragment
    pub b: f64,
    /// Length credit for a look-alike bridge character
    pub c: f64,
}

impl Default for FragmentParams {
    fn default() -> Self {
        Self {
            a: 0.45,
            b: 0.15,
            c: 0.0,
        }
    }
}

/// A run of equivalent characters shared by query and target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub query_start: usize,
    pub target_start: usize,
    pub length: usize,
    /// Offsets within the run matched through a look-alike pair
    pub similar_offsets: Vec<usize>,
}

impl Fragment {
    /// True when the fragment touches the start or end of either string
    #[must_use]
    pub fn touches_boundary(&self, query_len: usize, target_len: usize) -> bool {
        self.query_start == 0
            || self.target_start == 0
            || self.query_start + self.length == query_len
            || self.target_start + self.length == target_len
    }

    /// `max(0, (effective_len - b) * coeff)`
    #[must_use]
    pub fn contribution(&self, query_len: usize, target_len: usize, params: &FragmentParams) -> f64 {
        value(
            self.length,
            self.similar_offsets.len(),
            self.touches_boundary(query_len, target_len),
            params,
        )
    }
}

fn value(length: usize, similar: usize, boundary: bool, params: &FragmentParams) -> f64 {
    let effective = count_to_f64(length - similar) + count_to_f64(similar) * params.c;
    let coeff = if boundary { 1.0 } else { params.a };
    ((effective - params.b) * coeff).max(0.0)
}

/// Grow a fragment from `(si, ti)` until a used position or a non-match
fn grow(
    s: &[char],
    t: &[char],
    si: usize,
    ti: usize,
    is_used: impl Fn(usize, usize) -> bool,
) -> Option<Fragment> {
    let mut length = 0;
    let mut similar_offsets = Vec::new();

    while si + length < s.len() && ti + length < t.len() && !is_used(si + length, ti + length) {
        match compare_chars(s[si + length], t[ti + length]) {
            CharMatch::None => break,
            CharMatch::Similar => similar_offsets.push(length),
            CharMatch::Exact | CharMatch::Diacritic => {}
        }
        length += 1;
    }

    (length > 0).then_some(Fragment {
        query_start: si,
        target_start: ti,
        length,
        similar_offsets,
    })
}

fn bit(i: usize) -> u64 {
    1u64 << i
}

fn span_bits(start: usize, length: usize) -> u64 {
    (start..start + length).fold(0, |acc, i| acc | bit(i))
}

/// Free positions from `start` up to the next used one
fn free_run(used: u64, start: usize, len: usize) -> usize {
    let free = (used >> start).trailing_zeros() as usize;
    free.min(len - start)
}

/// Memoised exhaustive search over used-position bitsets.
///
/// `runs` and `similar` are diagonal suffix tables: the length of the
/// equivalent run starting at `(i, j)` ignoring used positions, and how many
/// of its characters match through a look-alike pair. Any fragment's length
/// and value then follow from the used bitsets in constant time.
struct Search<'a> {
    s: &'a [char],
    t: &'a [char],
    params: &'a FragmentParams,
    runs: Vec<usize>,
    similar: Vec<usize>,
    /// Best remaining total and the start of the first fragment achieving it
    memo: HashMap<(u64, u64), (f64, Option<(usize, usize)>)>,
    steps: usize,
    max_steps: usize,
}

impl<'a> Search<'a> {
    fn new(s: &'a [char], t: &'a [char], params: &'a FragmentParams, max_steps: usize) -> Self {
        let width = t.len() + 1;
        let mut runs = vec![0; (s.len() + 1) * width];
        let mut similar = vec![0; (s.len() + 1) * width];
        for i in (0..s.len()).rev() {
            for j in (0..t.len()).rev() {
                let here = i * width + j;
                let next = (i + 1) * width + j + 1;
                match compare_chars(s[i], t[j]) {
                    CharMatch::None => {}
                    tier => {
                        runs[here] = runs[next] + 1;
                        similar[here] = similar[next] + usize::from(tier == CharMatch::Similar);
                    }
                }
            }
        }

        Self {
            s,
            t,
            params,
            runs,
            similar,
            memo: HashMap::new(),
            steps: 0,
            max_steps,
        }
    }

    fn index(&self, i: usize, j: usize) -> usize {
        i * (self.t.len() + 1) + j
    }

    /// Length and value of the fragment starting at an unused `(si, ti)`
    fn fragment_at(&self, used_s: u64, used_t: u64, si: usize, ti: usize) -> Option<(usize, f64)> {
        let length = self.runs[self.index(si, ti)]
            .min(free_run(used_s, si, self.s.len()))
            .min(free_run(used_t, ti, self.t.len()));
        if length == 0 {
            return None;
        }
        let similar = self.similar[self.index(si, ti)] - self.similar[self.index(si + length, ti + length)];
        let boundary = si == 0
            || ti == 0
            || si + length == self.s.len()
            || ti + length == self.t.len();
        Some((length, value(length, similar, boundary, self.params)))
    }

    /// Best total from this state, or `None` once the step budget is spent
    fn best(&mut self, used_s: u64, used_t: u64) -> Option<f64> {
        if let Some((total, _)) = self.memo.get(&(used_s, used_t)) {
            return Some(*total);
        }

        let mut best = (0.0, None);
        for si in (0..self.s.len()).filter(|&i| used_s & bit(i) == 0) {
            for ti in (0..self.t.len()).filter(|&j| used_t & bit(j) == 0) {
                let Some((length, value)) = self.fragment_at(used_s, used_t, si, ti) else {
                    continue;
                };
                self.steps += 1;
                if self.steps > self.max_steps {
                    return None;
                }
                let rest = self.best(used_s | span_bits(si, length), used_t | span_bits(ti, length))?;
                if value + rest > best.0 {
                    best = (value + rest, Some((si, ti)));
                }
            }
        }

        self.memo.insert((used_s, used_t), best);
        Some(best.0)
    }

    /// The optimal fragment chain, or `None` if the budget ran out first
    fn solve(mut self) -> Option<Vec<Fragment>> {
        self.best(0, 0)?;

        let mut fragments = Vec::new();
        let (mut used_s, mut used_t) = (0u64, 0u64);
        while let Some(&(_, Some((si, ti)))) = self.memo.get(&(used_s, used_t)) {
            let fragment = grow(self.s, self.t, si, ti, |i, j| {
                used_s & bit(i) != 0 || used_t & bit(j) != 0
            })?;
            used_s |= span_bits(fragment.query_start, fragment.length);
            used_t |= span_bits(fragment.target_start, fragment.length);
            fragments.push(fragment);
        }
        Some(fragments)
    }
}

/// Greedy selection for inputs too long for the bitset search
fn greedy(s: &[char], t: &[char], params: &FragmentParams) -> Vec<Fragment> {
    let mut used_s = vec![false; s.len()];
    let mut used_t = vec![false; t.len()];
    let mut fragments = Vec::new();

    loop {
        let mut pick: Option<(f64, Fragment)> = None;
        for si in (0..s.len()).filter(|&i| !used_s[i]) {
            for ti in (0..t.len()).filter(|&j| !used_t[j]) {
                let Some(fragment) = grow(s, t, si, ti, |i, j| used_s[i] || used_t[j]) else {
                    continue;
                };
                let score = fragment.contribution(s.len(), t.len(), params);
                if score > pick.as_ref().map_or(0.0, |(best, _)| *best) {
                    pick = Some((score, fragment));
                }
            }
        }

        let Some((_, fragment)) = pick else {
            break;
        };
        for k in 0..fragment.length {
            used_s[fragment.query_start + k] = true;
            used_t[fragment.target_start + k] = true;
        }
        fragments.push(fragment);
    }

    fragments
}

/// Fragment pattern similarity scorer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FragmentScorer {
    pub params: FragmentParams,
}

impl FragmentScorer {
    #[must_use]
    pub fn new(params: FragmentParams) -> Self {
        Self { params }
    }

    /// The fragment set maximising the score, without the shortcuts of [`Self::score`]
    #[must_use]
    pub fn fragments(&self, query: &str, target: &str) -> Vec<Fragment> {
        let s: Vec<char> = query.chars().collect();
        let t: Vec<char> = target.chars().collect();
        self.select(&s, &t, MAX_SEARCH_STEPS)
    }

    fn select(&self, s: &[char], t: &[char], max_steps: usize) -> Vec<Fragment> {
        if s.is_empty() || t.is_empty() {
            return Vec::new();
        }
        if s.len() > MAX_EXHAUSTIVE_CHARS || t.len() > MAX_EXHAUSTIVE_CHARS {
            tracing::debug!(
                query_len = s.len(),
                target_len = t.len(),
                "fragment search over length limit, using greedy selection"
            );
            return greedy(s, t, &self.params);
        }
        Search::new(s, t, &self.params, max_steps).solve().unwrap_or_else(|| {
            tracing::debug!(
                query_len = s.len(),
                target_len = t.len(),
                max_steps,
                "fragment search over step budget, using greedy selection"
            );
            greedy(s, t, &self.params)
        })
    }

    fn score_chars(&self, s: &[char], t: &[char], max_steps: usize) -> f64 {
        if s == t {
            return 1.0;
        }
        if s.is_empty() || t.is_empty() {
            return 0.0;
        }
        if s.len() == t.len() && s.iter().zip(t).all(|(&a, &b)| compare_chars(a, b).is_full()) {
            return 1.0;
        }

        let total: f64 = self
            .select(s, t, max_steps)
            .iter()
            .map(|f| f.contribution(s.len(), t.len(), &self.params))
            .sum();
        total / (count_to_f64(s.len() + t.len()) / 2.0)
    }
}

impl Similarity for FragmentScorer {
    fn name(&self) -> &'static str {
        "fragment"
    }

    fn score(&self, query: &str, candidate: &str) -> f64 {
        let s: Vec<char> = query.chars().collect();
        let t: Vec<char> = candidate.chars().collect();
        self.score_chars(&s, &t, MAX_SEARCH_STEPS)
    }
}
