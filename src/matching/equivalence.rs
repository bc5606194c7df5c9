//! Character equivalence used by the fragment scorer.
//!
//! Three tiers, strongest first: identical characters, characters that only
//! differ by a voiced/semi-voiced mark (ガ/カ, バ/パ/ハ, ヴ/ウ), and a small set
//! of katakana that OCR routinely confuses (シ/ツ, ソ/ン, ...).

/// How two characters matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharMatch {
    Exact,
    Diacritic,
    Similar,
    None,
}

impl CharMatch {
    /// Exact and diacritic matches count fully toward fragment length
    #[must_use]
    pub fn is_full(self) -> bool {
        matches!(self, Self::Exact | Self::Diacritic)
    }
}

/// Visually confusable pairs, defined on unvoiced bases
const SIMILAR_PAIRS: &[(char, char)] = &[
    ('シ', 'ツ'),
    ('ソ', 'ン'),
    ('ク', 'ワ'),
    ('ク', 'ケ'),
    ('コ', 'ユ'),
    ('ナ', 'メ'),
];

/// Collapse a voiced or semi-voiced katakana to its unvoiced base
#[must_use]
pub fn unvoiced(c: char) -> char {
    match c {
        'ガ' => 'カ',
        'ギ' => 'キ',
        'グ' => 'ク',
        'ゲ' => 'ケ',
        'ゴ' => 'コ',
        'ザ' => 'サ',
        'ジ' => 'シ',
        'ズ' => 'ス',
        'ゼ' => 'セ',
        'ゾ' => 'ソ',
        'ダ' => 'タ',
        'ヂ' => 'チ',
        'ヅ' => 'ツ',
        'デ' => 'テ',
        'ド' => 'ト',
        'バ' | 'パ' => 'ハ',
        'ビ' | 'ピ' => 'ヒ',
        'ブ' | 'プ' => 'フ',
        'ベ' | 'ペ' => 'ヘ',
        'ボ' | 'ポ' => 'ホ',
        'ヴ' => 'ウ',
        _ => c,
    }
}

fn similar_bases(a: char, b: char) -> bool {
    SIMILAR_PAIRS
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Compare two characters under the equivalence tiers
#[must_use]
pub fn compare_chars(a: char, b: char) -> CharMatch {
    if a == b {
        return CharMatch::Exact;
    }
    let (base_a, base_b) = (unvoiced(a), unvoiced(b));
    if base_a == base_b {
        CharMatch::Diacritic
    } else if similar_bases(base_a, base_b) {
        CharMatch::Similar
    } else {
        CharMatch::None
    }
}
