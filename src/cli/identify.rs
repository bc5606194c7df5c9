use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::cli::{CatalogSource, OutputFormat};
use crate::matching::edit_distance::EditCosts;
use crate::matching::engine::{BestMatchStyle, Candidate, MatchResult, MatchingConfig, MatchingEngine};
use crate::matching::fragment::FragmentParams;
use crate::matching::scoring::Algorithm;
use crate::matching::segments::{match_segments, OcrLine, SegmentMatch};
use crate::parsing::names::read_name_list;
use crate::utils::validation::validate_batch;

#[derive(Args)]
pub struct IdentifyArgs {
    /// Drug names to identify
    pub names: Vec<String>,

    /// Read names from a file, one per line ('-' for stdin)
    #[arg(short, long, conflicts_with = "segments")]
    pub input: Option<PathBuf>,

    /// Read segmented OCR lines (JSON array of {text, confidence, segments})
    #[arg(long, conflicts_with = "names")]
    pub segments: Option<PathBuf>,

    #[command(flatten)]
    pub source: CatalogSource,

    /// Similarity algorithm
    #[arg(long, value_enum, default_value_t = Algorithm::Levenshtein)]
    pub algorithm: Algorithm,

    /// Report the catalog's own name instead of re-wrapping the input's annotations
    #[arg(long)]
    pub display_name: bool,

    /// Number of ranked candidates to show per name
    #[arg(short = 'n', long, default_value = "1")]
    pub candidates: usize,

    // === Fragment scorer options ===
    /// Position coefficient for interior fragments
    #[arg(long, default_value = "0.45")]
    pub fragment_a: f64,

    /// Length discount per fragment
    #[arg(long, default_value = "0.15")]
    pub fragment_b: f64,

    /// Length credit for look-alike characters
    #[arg(long, default_value = "0.0")]
    pub fragment_c: f64,
}

impl IdentifyArgs {
    fn config(&self) -> MatchingConfig {
        MatchingConfig {
            algorithm: self.algorithm,
            edit_costs: EditCosts::default(),
            fragment_params: FragmentParams {
                a: self.fragment_a,
                b: self.fragment_b,
                c: self.fragment_c,
            },
            best_match_style: if self.display_name {
                BestMatchStyle::Display
            } else {
                BestMatchStyle::Rewrap
            },
        }
    }
}

#[derive(Serialize)]
struct IdentifyOutput {
    #[serde(flatten)]
    result: MatchResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    candidates: Vec<Candidate>,
}

/// Execute identify subcommand
///
/// # Errors
///
/// Returns an error if the catalog or input cannot be read, or the input
/// exceeds the batch limits.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: IdentifyArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let catalog = args.source.load()?;
    if verbose {
        eprintln!(
            "Loaded catalog with {} entries ({} profile)",
            catalog.len(),
            catalog.profile()
        );
    }
    if catalog.is_empty() {
        eprintln!("Warning: Catalog is empty, no references to match against.");
    }

    let config = args.config();
    if verbose {
        eprintln!("Algorithm: {}", config.algorithm);
    }
    let engine = MatchingEngine::with_config(&catalog, config);

    if let Some(path) = &args.segments {
        let lines = read_segments(path)?;
        let matches = match_segments(&engine, &lines);
        return print_segment_matches(&matches, format);
    }

    let names = match &args.input {
        Some(path) => read_name_list(path)?,
        None => args.names.clone(),
    };
    validate_batch(&names, false)?;

    let results = engine.match_all(&names);
    let outputs: Vec<IdentifyOutput> = results
        .into_iter()
        .map(|result| {
            let candidates = if args.candidates > 1 {
                engine.find_candidates(&result.input, args.candidates)
            } else {
                Vec::new()
            };
            IdentifyOutput { result, candidates }
        })
        .collect();

    match format {
        OutputFormat::Text => print_text_results(&outputs),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outputs)?),
        OutputFormat::Tsv => print_tsv_results(&outputs),
    }

    Ok(())
}

fn read_segments(path: &Path) -> anyhow::Result<Vec<OcrLine>> {
    let content = std::fs::read_to_string(path)?;
    let lines: Vec<OcrLine> = serde_json::from_str(&content)?;
    Ok(lines)
}

fn print_text_results(outputs: &[IdentifyOutput]) {
    for output in outputs {
        let r = &output.result;
        println!("\n{}", r.input);
        if r.is_unmatched_sentinel() {
            println!("   No catalog entries to match against");
            continue;
        }
        println!("   Best match: {}", r.best_match);
        println!("   Score:      {:.2} ({})", r.score, r.status);

        if !output.candidates.is_empty() {
            println!("   Candidates:");
            for (i, c) in output.candidates.iter().enumerate() {
                println!(
                    "   {:>2}. [{}] {} ({}, {}) {:.2}",
                    i + 1,
                    c.id,
                    c.name,
                    c.field,
                    c.category,
                    c.score
                );
            }
        }
    }
    println!();
}

fn print_tsv_results(outputs: &[IdentifyOutput]) {
    println!("input\trank\tbest_match\tscore\tstatus\tid\tfield");
    for output in outputs {
        let r = &output.result;
        println!("{}\t0\t{}\t{:.2}\t{}\t\t", r.input, r.best_match, r.score, r.status);
        for (i, c) in output.candidates.iter().enumerate() {
            println!(
                "{}\t{}\t{}\t{:.2}\t{}\t{}\t{}",
                r.input,
                i + 1,
                c.name,
                c.score,
                c.status,
                c.id,
                c.field
            );
        }
    }
}

fn print_segment_matches(matches: &[SegmentMatch], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for m in matches {
                println!("\n[line {}, ocr {:.2}] {}", m.source_line, m.confidence, m.input);
                println!("   Normalized: {}", m.normalized);
                println!("   Best match: {}", m.best_match);
                println!("   Score:      {:.2} ({})", m.score, m.status);
            }
            println!();
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(matches)?),
        OutputFormat::Tsv => {
            println!("source_line\tconfidence\tinput\tnormalized\tbest_match\tscore\tstatus");
            for m in matches {
                println!(
                    "{}\t{:.2}\t{}\t{}\t{}\t{:.2}\t{}",
                    m.source_line, m.confidence, m.input, m.normalized, m.best_match, m.score, m.status
                );
            }
        }
    }
    Ok(())
}
