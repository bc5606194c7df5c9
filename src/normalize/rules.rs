use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which rule set the normalizer applies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationProfile {
    /// Strip dose, form and maker tokens only. Bare digits survive.
    Standard,
    /// Also strip bare numbers, dimensions, a lone 液 and every remaining symbol
    #[default]
    Extended,
}

impl NormalizationProfile {
    /// Pharmaceutical form words for this profile, longest first
    #[must_use]
    pub fn form_words(self) -> &'static [&'static str] {
        match self {
            Self::Standard => STANDARD_FORMS_SORTED.as_slice(),
            Self::Extended => EXTENDED_FORMS_SORTED.as_slice(),
        }
    }

    pub(crate) fn rules(self) -> &'static [Rule] {
        match self {
            Self::Standard => STANDARD_RULES.as_slice(),
            Self::Extended => EXTENDED_RULES.as_slice(),
        }
    }
}

impl std::fmt::Display for NormalizationProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Extended => write!(f, "extended"),
        }
    }
}

const STANDARD_FORM_WORDS: &[&str] = &[
    "口腔内崩壊錠",
    "ドライシロップ",
    "吸入粉末剤",
    "点滴静注用",
    "吸入麻酔液",
    "OD錠",
    "注射液",
    "注射用",
    "点滴静注",
    "吸入液",
    "吸入用",
    "内用液",
    "経口液",
    "点眼液",
    "点鼻液",
    "静注用",
    "貼付剤",
    "皮下注",
    "カプセル",
    "シロップ",
    "ローション",
    "クリーム",
    "テープ",
    "パッチ",
    "静注",
    "筋注",
    "坐剤",
    "座薬",
    "軟膏",
    "ゲル",
    "吸入",
    "点眼",
    "点鼻",
    "点耳",
    "噴霧",
    "懸濁",
    "乳剤",
    "腸溶",
    "徐放",
    "配合",
    "細粒",
    "顆粒",
    "錠",
    "散",
    "注",
];

const EXTENDED_FORM_WORDS: &[&str] = &[
    // ophthalmic / otic compounds
    "眼科耳鼻科用液",
    "眼耳鼻科用液",
    "口腔内崩壊錠",
    "ドライシロップ",
    "眼科耳科用液",
    "眼科外用液",
    "吸入粉末剤",
    "点滴静注用",
    "吸入麻酔液",
    "眼粘弾剤",
    "眼灌流液",
    "耳科用液",
    "口腔用液",
    "溶解液",
    "うがい液",
    "点耳液",
    "粉末剤",
    "パップ剤",
    "灌流液",
    "洗眼液",
    "OD錠",
    "注射液",
    "注射用",
    "点滴静注",
    "吸入液",
    "吸入用",
    "内用液",
    "経口液",
    "点眼液",
    "点鼻液",
    "静注用",
    "貼付剤",
    "皮下注",
    "カプセル",
    "シロップ",
    "ローション",
    "クリーム",
    "テープ",
    "パッチ",
    "製剤",
    "静注",
    "筋注",
    "坐剤",
    "座薬",
    "軟膏",
    "ゲル",
    "吸入",
    "点眼",
    "点鼻",
    "点耳",
    "噴霧",
    "懸濁",
    "乳剤",
    "腸溶",
    "徐放",
    "配合",
    "細粒",
    "顆粒",
    "錠",
    "散",
    "注",
    "剤",
    "瓶",
    "用",
    "V",
    "pp",
];

static STANDARD_FORMS_SORTED: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| longest_first(STANDARD_FORM_WORDS));
static EXTENDED_FORMS_SORTED: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| longest_first(EXTENDED_FORM_WORDS));

/// Number immediately followed by a unit, e.g. `10mg`, `0.5%`, `2mg/mL`
const DOSE_PATTERN: &str =
    r"(?i)[0-9]+\.?[0-9]*\s*(?:mg|g|ml|l|%|μg|mcg|iu|単位|万単位)(?:/[A-Za-z0-9_]+)?";

/// Maker annotation in any bracket style: `(サワイ)`, `（日医工）`, `「トーワ」`
const MAKER_PATTERN: &str = r"[(（「][^)）」]*[)）」]";

/// Bare numbers, including sizes such as `10cm`
const BARE_NUMBER_PATTERN: &str = r"[0-9.]+(?:mm|cm)?";

const DIMENSION_SEPARATOR_PATTERN: &str = r"[×xX]";

/// Anything outside ASCII letters, kana, the long-vowel mark and CJK ideographs
const SYMBOL_PATTERN: &str = r"[^a-zA-Zぁ-んァ-ヶー\x{4E00}-\x{9FFF}\x{3400}-\x{4DBF}]";

/// One removal pass over the visible characters
pub(crate) enum Rule {
    Pattern(Regex),
    /// 液 on its own, except in 涙液 and 液化
    Liquid,
}

static STANDARD_RULES: LazyLock<Vec<Rule>> =
    LazyLock::new(|| build_rules(NormalizationProfile::Standard));
static EXTENDED_RULES: LazyLock<Vec<Rule>> =
    LazyLock::new(|| build_rules(NormalizationProfile::Extended));

/// Build the ordered removal passes for a profile. Order is significant.
fn build_rules(profile: NormalizationProfile) -> Vec<Rule> {
    let forms = profile
        .form_words()
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");

    let mut rules = vec![
        Rule::Pattern(compile(DOSE_PATTERN)),
        Rule::Pattern(compile(&format!(
            r"(?i)[0-9]+\.?[0-9]*\s*(?:{forms})|(?:{forms})\s*[0-9]+\.?[0-9]*"
        ))),
        Rule::Pattern(compile(&format!("(?i){forms}"))),
        Rule::Pattern(compile(MAKER_PATTERN)),
    ];

    if profile == NormalizationProfile::Extended {
        rules.push(Rule::Liquid);
        rules.push(Rule::Pattern(compile(BARE_NUMBER_PATTERN)));
        rules.push(Rule::Pattern(compile(DIMENSION_SEPARATOR_PATTERN)));
        rules.push(Rule::Pattern(compile(SYMBOL_PATTERN)));
    }

    rules
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("normalization patterns are valid regular expressions")
}

/// Stable sort by character count, longest first, so a short form word never
/// shadows a longer one that contains it.
fn longest_first(words: &[&'static str]) -> Vec<&'static str> {
    let mut sorted = words.to_vec();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    sorted
}

/// Map full-width ASCII letters and digits to their half-width forms
#[must_use]
pub fn fold_width(c: char) -> char {
    match c {
        'Ａ'..='Ｚ' | 'ａ'..='ｚ' | '０'..='９' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        _ => c,
    }
}

/// Lowercase a character when its lowercase form is a single character
#[must_use]
pub fn fold_case(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Map full-width punctuation to ASCII. Corner brackets become parentheses.
#[must_use]
pub fn fold_symbol(c: char) -> char {
    match c {
        '「' => '(',
        '」' => ')',
        '％' => '%',
        '．' => '.',
        '／' => '/',
        '\u{3000}' => ' ',
        _ => c,
    }
}
