use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::matching::edit_distance::EditDistanceScorer;
use crate::matching::fragment::{Fragment, FragmentScorer};
use crate::matching::scoring::Similarity;
use crate::normalize::{NormalizationProfile, Normalizer};

/// Pairs that show where the two scorers disagree
const DEMO_CASES: &[(&str, &str, &str)] = &[
    ("ロキソニン", "ロキソニン", "identical"),
    ("ブルゼニド", "プルゼニド", "voicing mark (ブ/プ)"),
    ("エスゾビクロン", "エスゾピクロン", "voicing mark (ビ/ピ)"),
    ("デバケン", "デパケン", "voicing mark (バ/パ)"),
    ("ファモチワン", "ファモチジン", "misread character (ワ/ジ)"),
    ("サイザル", "ザイザル", "voicing mark at the start"),
];

#[derive(Args)]
pub struct CompareArgs {
    /// First name (the OCR reading)
    #[arg(required_unless_present = "demo")]
    pub query: Option<String>,

    /// Second name (the reference)
    #[arg(required_unless_present = "demo")]
    pub target: Option<String>,

    /// Run the built-in contrast cases instead
    #[arg(long, conflicts_with_all = ["query", "target"])]
    pub demo: bool,

    /// Normalization rule profile
    #[arg(long, value_enum, default_value_t = NormalizationProfile::Extended)]
    pub profile: NormalizationProfile,
}

#[derive(Serialize)]
struct Comparison {
    query: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'static str>,
    levenshtein: f64,
    fragment: f64,
    normalized_query: String,
    normalized_target: String,
    normalized_levenshtein: f64,
    normalized_fragment: f64,
    fragments: Vec<Fragment>,
}

fn compare(
    normalizer: &Normalizer,
    query: &str,
    target: &str,
    description: Option<&'static str>,
) -> Comparison {
    let edit = EditDistanceScorer::default();
    let fragment = FragmentScorer::default();

    let normalized_query = normalizer.normalize(query).normalized;
    let normalized_target = normalizer.normalize(target).normalized;

    Comparison {
        query: query.to_string(),
        target: target.to_string(),
        description,
        levenshtein: edit.score(query, target),
        fragment: fragment.score(query, target),
        normalized_levenshtein: edit.score(&normalized_query, &normalized_target),
        normalized_fragment: fragment.score(&normalized_query, &normalized_target),
        fragments: fragment.fragments(&normalized_query, &normalized_target),
        normalized_query,
        normalized_target,
    }
}

/// Pad to a display width counted in characters
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    format!("{s}{}", " ".repeat(width.saturating_sub(len)))
}

/// Execute compare subcommand
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CompareArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let normalizer = Normalizer::new(args.profile);

    let comparisons: Vec<Comparison> = match (&args.query, &args.target) {
        (Some(query), Some(target)) if !args.demo => vec![compare(&normalizer, query, target, None)],
        _ => DEMO_CASES
            .iter()
            .map(|&(q, t, d)| compare(&normalizer, q, t, Some(d)))
            .collect(),
    };

    match format {
        OutputFormat::Text => print_text(&comparisons, verbose || !args.demo),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&comparisons)?),
        OutputFormat::Tsv => {
            println!("query\ttarget\tlevenshtein\tfragment\tnormalized_query\tnormalized_target\tnormalized_levenshtein\tnormalized_fragment");
            for c in &comparisons {
                println!(
                    "{}\t{}\t{:.4}\t{:.4}\t{}\t{}\t{:.4}\t{:.4}",
                    c.query,
                    c.target,
                    c.levenshtein,
                    c.fragment,
                    c.normalized_query,
                    c.normalized_target,
                    c.normalized_levenshtein,
                    c.normalized_fragment
                );
            }
        }
    }

    Ok(())
}

fn print_text(comparisons: &[Comparison], show_fragments: bool) {
    println!(
        "\n  {}  {}  {}  {}",
        pad("Query", 14),
        pad("Target", 14),
        pad("Levenshtein", 12),
        pad("Fragment", 12)
    );
    println!("  {}", "-".repeat(60));

    for c in comparisons {
        println!(
            "  {}  {}  {}  {}  {}",
            pad(&c.query, 14),
            pad(&c.target, 14),
            pad(&format!("{:.4}", c.levenshtein), 12),
            pad(&format!("{:.4}", c.fragment), 12),
            c.description.unwrap_or_default()
        );

        if c.normalized_query != c.query || c.normalized_target != c.target {
            println!(
                "  {}  {}  {}  {}  (normalized)",
                pad(&c.normalized_query, 14),
                pad(&c.normalized_target, 14),
                pad(&format!("{:.4}", c.normalized_levenshtein), 12),
                pad(&format!("{:.4}", c.normalized_fragment), 12),
            );
        }

        if show_fragments {
            let query: Vec<char> = c.normalized_query.chars().collect();
            for f in &c.fragments {
                let text: String = query[f.query_start..f.query_start + f.length].iter().collect();
                let bridged = if f.similar_offsets.is_empty() {
                    String::new()
                } else {
                    format!(", look-alike at {:?}", f.similar_offsets)
                };
                println!(
                    "     fragment \"{text}\" query@{} target@{} len {}{bridged}",
                    f.query_start, f.target_start, f.length
                );
            }
        }
    }
    println!();
}
