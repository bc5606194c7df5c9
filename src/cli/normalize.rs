use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::normalize::{NormalizationProfile, NormalizedName, Normalizer};

#[derive(Args)]
pub struct NormalizeArgs {
    /// Drug names to normalize
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Normalization rule profile
    #[arg(long, value_enum, default_value_t = NormalizationProfile::Extended)]
    pub profile: NormalizationProfile,
}

#[derive(Serialize)]
struct NormalizeOutput<'a> {
    input: &'a str,
    #[serde(flatten)]
    name: NormalizedName,
}

/// Execute normalize subcommand
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: NormalizeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let normalizer = Normalizer::new(args.profile);
    let results: Vec<NormalizeOutput<'_>> = args
        .names
        .iter()
        .map(|input| NormalizeOutput {
            input,
            name: normalizer.normalize(input),
        })
        .collect();

    match format {
        OutputFormat::Text => {
            for r in &results {
                println!("{}", r.input);
                println!("   Normalized: {}", r.name.normalized);
                println!("   Prefix:     {}", r.name.prefix);
                println!("   Suffix:     {}", r.name.suffix);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Tsv => {
            println!("input\tnormalized\tprefix\tsuffix");
            for r in &results {
                println!(
                    "{}\t{}\t{}\t{}",
                    r.input, r.name.normalized, r.name.prefix, r.name.suffix
                );
            }
        }
    }

    Ok(())
}
