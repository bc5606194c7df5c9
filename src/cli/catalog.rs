use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::catalog::builder::CatalogBuilder;
use crate::catalog::store::ReferenceCatalog;
use crate::cli::{CatalogSource, OutputFormat};
use crate::core::reference::ReferenceEntry;
use crate::core::types::ReferenceId;
use crate::normalize::NormalizationProfile;

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List all entries in the catalog
    List {
        #[command(flatten)]
        source: CatalogSource,

        /// Filter by category (e.g., "内用薬")
        #[arg(long)]
        category: Option<String>,
    },

    /// Show details of a specific entry
    Show {
        /// Entry ID
        #[arg(required = true)]
        id: ReferenceId,

        #[command(flatten)]
        source: CatalogSource,
    },

    /// Find entries whose normalized names contain a keyword
    Search {
        /// Keyword (normalized before searching)
        #[arg(required = true)]
        keyword: String,

        #[command(flatten)]
        source: CatalogSource,
    },

    /// Show entry counts per category
    Stats {
        #[command(flatten)]
        source: CatalogSource,
    },

    /// Export the catalog to a file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        #[command(flatten)]
        source: CatalogSource,
    },

    /// Build a catalog from drug master sheets (TSV or CSV)
    Build {
        /// Input file(s) - can be specified multiple times
        #[arg(short, long = "input", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Append to an existing catalog file
        #[arg(long)]
        append_to: Option<PathBuf>,

        /// Output file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Normalization rule profile
        #[arg(long, value_enum, default_value_t = NormalizationProfile::Extended)]
        profile: NormalizationProfile,
    },
}

/// Execute catalog subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the entry is not found,
/// or an input file cannot be imported.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CatalogCommands::List { source, category } => {
            let catalog = source.load()?;
            let entries: Vec<&ReferenceEntry> = catalog
                .references
                .iter()
                .filter(|r| category.as_deref().map_or(true, |c| r.category == c))
                .collect();
            print_entries(&entries, format)
        }
        CatalogCommands::Show { id, source } => {
            let catalog = source.load()?;
            let entry = catalog
                .get(id)
                .ok_or_else(|| anyhow::anyhow!("Entry not found: {id}"))?;
            print_entry_detail(entry, format)
        }
        CatalogCommands::Search { keyword, source } => {
            let catalog = source.load()?;
            let hits = catalog.search(&keyword);
            if verbose {
                eprintln!(
                    "Search \"{keyword}\" -> normalized \"{}\": {} hits",
                    catalog.normalizer().normalize(&keyword).normalized,
                    hits.len()
                );
            }
            print_entries(&hits, format)
        }
        CatalogCommands::Stats { source } => {
            let catalog = source.load()?;
            print_stats(&catalog, format)
        }
        CatalogCommands::Export { output, source } => {
            let catalog = source.load()?;
            std::fs::write(&output, catalog.to_json()?)?;
            eprintln!("Exported {} entries to {}", catalog.len(), output.display());
            Ok(())
        }
        CatalogCommands::Build {
            inputs,
            append_to,
            output,
            profile,
        } => run_build(&inputs, append_to, output, profile, verbose),
    }
}

fn run_build(
    inputs: &[PathBuf],
    append_to: Option<PathBuf>,
    output: Option<PathBuf>,
    profile: NormalizationProfile,
    verbose: bool,
) -> anyhow::Result<()> {
    let mut builder = match &append_to {
        Some(path) => CatalogBuilder::from_catalog(&ReferenceCatalog::load_from_file(path, profile)?),
        None => CatalogBuilder::new(profile),
    };

    for input in inputs {
        let added = builder.add_input(input)?;
        if verbose {
            eprintln!("{}: {added} rows", input.display());
        }
    }

    let catalog = builder.build();
    let json = catalog.to_json()?;

    match output.or(append_to) {
        Some(path) => {
            std::fs::write(&path, json)?;
            eprintln!("Wrote {} entries to {}", catalog.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn print_entries(entries: &[&ReferenceEntry], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{:<6} {:<10} {:<28} {}", "ID", "Category", "Name", "Generic");
            println!("{}", "-".repeat(72));
            for r in entries {
                let name = r.display_name();
                let generic = if name == r.generic_name { "" } else { r.generic_name.as_str() };
                println!("{:<6} {:<10} {:<28} {}", r.id, r.category, name, generic);
            }
            println!("\n{} entries", entries.len());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(entries)?),
        OutputFormat::Tsv => {
            println!("id\tcategory\tbrand_name\tgeneric_name\tnormalized_brand\tnormalized_generic");
            for r in entries {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    r.id,
                    r.category,
                    r.brand_name,
                    r.generic_name,
                    r.normalized_brand,
                    r.normalized_generic
                );
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct EntryDetail<'a> {
    #[serde(flatten)]
    entry: &'a ReferenceEntry,
    normalized_generic: &'a str,
    normalized_brand: &'a str,
}

fn print_entry_detail(entry: &ReferenceEntry, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("ID:        {}", entry.id);
            println!("Category:  {}", entry.category);
            println!("Brand:     {}", entry.brand_name);
            println!("   -> {}", entry.normalized_brand);
            println!("Generic:   {}", entry.generic_name);
            println!("   -> {}", entry.normalized_generic);
        }
        OutputFormat::Json => {
            let detail = EntryDetail {
                entry,
                normalized_generic: &entry.normalized_generic,
                normalized_brand: &entry.normalized_brand,
            };
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        OutputFormat::Tsv => print_entries(&[entry], format)?,
    }
    Ok(())
}

#[derive(Serialize)]
struct CategoryCount {
    category: String,
    count: usize,
}

fn print_stats(catalog: &ReferenceCatalog, format: OutputFormat) -> anyhow::Result<()> {
    let counts: Vec<CategoryCount> = catalog
        .category_counts()
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();

    match format {
        OutputFormat::Text => {
            println!("Total entries: {} ({} profile)", catalog.len(), catalog.profile());
            println!("\nCategory counts:");
            for c in &counts {
                let label = if c.category.is_empty() { "(none)" } else { &c.category };
                println!("  {label}: {}", c.count);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "total": catalog.len(),
                "profile": catalog.profile(),
                "categories": counts,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Tsv => {
            println!("category\tcount");
            for c in &counts {
                println!("{}\t{}", c.category, c.count);
            }
        }
    }
    Ok(())
}
