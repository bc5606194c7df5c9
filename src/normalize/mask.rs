use regex::Regex;

use super::rules::Rule;

/// Inclusion mask over the characters of a prepared name.
///
/// Every pass sees only the characters still kept, with whitespace hidden.
/// Match positions in that visible text are mapped back to original indices
/// before being cleared, so a later pass can never re-match text an earlier
/// pass removed.
#[derive(Debug, Clone)]
pub(crate) struct RemovalMask {
    chars: Vec<char>,
    kept: Vec<bool>,
}

impl RemovalMask {
    pub fn new(chars: Vec<char>) -> Self {
        let kept = vec![true; chars.len()];
        Self { chars, kept }
    }

    /// Currently visible `(original index, char)` pairs
    fn visible(&self) -> Vec<(usize, char)> {
        self.chars
            .iter()
            .zip(&self.kept)
            .enumerate()
            .filter(|(_, (c, kept))| **kept && !c.is_whitespace())
            .map(|(i, (&c, _))| (i, c))
            .collect()
    }

    /// Apply one rule, returning whether anything was removed
    pub fn apply(&mut self, rule: &Rule) -> bool {
        match rule {
            Rule::Pattern(regex) => self.remove_matches(regex),
            Rule::Liquid => self.remove_lone_liquid(),
        }
    }

    /// Apply `rules` in order, repeating until a full round removes nothing
    pub fn apply_until_stable(&mut self, rules: &[Rule]) {
        loop {
            let mut changed = false;
            for rule in rules {
                changed |= self.apply(rule);
            }
            if !changed {
                break;
            }
        }
    }

    fn remove_matches(&mut self, regex: &Regex) -> bool {
        let visible = self.visible();
        let text: String = visible.iter().map(|&(_, c)| c).collect();
        let offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();

        let mut removed = false;
        for m in regex.find_iter(&text) {
            let start = offsets.partition_point(|&b| b < m.start());
            let end = offsets.partition_point(|&b| b < m.end());
            for &(original, _) in &visible[start..end] {
                self.kept[original] = false;
                removed = true;
            }
        }
        removed
    }

    fn remove_lone_liquid(&mut self) -> bool {
        let visible = self.visible();
        let mut removed = false;
        for (i, &(original, c)) in visible.iter().enumerate() {
            if c != '液' {
                continue;
            }
            let after_tear = i > 0 && visible[i - 1].1 == '涙';
            let before_ka = visible.get(i + 1).is_some_and(|&(_, next)| next == '化');
            if !after_tear && !before_ka {
                self.kept[original] = false;
                removed = true;
            }
        }
        removed
    }

    /// First and last kept non-whitespace positions, if any survive
    pub fn core_span(&self) -> Option<(usize, usize)> {
        let mut kept = self
            .chars
            .iter()
            .zip(&self.kept)
            .enumerate()
            .filter(|(_, (c, kept))| **kept && !c.is_whitespace())
            .map(|(i, _)| i);
        let first = kept.next()?;
        let last = kept.last().unwrap_or(first);
        Some((first, last))
    }

    /// Kept characters with whitespace dropped, i.e. the visible text
    pub fn kept_text(&self) -> String {
        self.visible().into_iter().map(|(_, c)| c).collect()
    }
}
