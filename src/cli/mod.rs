//! Command-line interface for medmatch.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **normalize**: Strip dosage, form and maker annotations from drug names
//! - **identify**: Match OCR-read drug names against the catalog
//! - **compare**: Score two names with both algorithms side by side
//! - **catalog**: List, search, export or build drug catalogs
//! - **serve**: Start the JSON HTTP API
//!
//! ## Usage
//!
//! ```text
//! # Identify a single name
//! medmatch identify "ブルゼニド錠12mg"
//!
//! # Batch from a file, fragment scorer, top 3 candidates each
//! medmatch identify -i names.txt --algorithm fragment -n 3
//!
//! # JSON output for scripting
//! medmatch -f json identify "ロキソニン錠60mg" --catalog master.json
//!
//! # Import a master sheet
//! medmatch catalog build --input master.tsv --output master.json
//!
//! # Start the API
//! medmatch serve --port 8080
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::catalog::store::ReferenceCatalog;
use crate::normalize::NormalizationProfile;

pub mod catalog;
pub mod compare;
pub mod identify;
pub mod normalize;

#[derive(Parser)]
#[command(name = "medmatch")]
#[command(version)]
#[command(about = "Normalize and fuzzy-match OCR-read Japanese drug names")]
#[command(
    long_about = "medmatch matches drug names read by OCR from prescriptions against a reference drug master list.\n\nIt strips dosage, form and maker annotations, tolerates OCR substitutions (lost or added diacritics, look-alike katakana, dropped characters) and classifies each best match as unmodified, modified or no_match."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize drug names without matching
    Normalize(normalize::NormalizeArgs),

    /// Find the best catalog match for drug names
    Identify(identify::IdentifyArgs),

    /// Compare two names with both scoring algorithms
    Compare(compare::CompareArgs),

    /// Manage the drug catalog
    Catalog(catalog::CatalogArgs),

    /// Start the web server
    Serve(ServeArgs),
}

/// Where the catalog comes from and how it is normalized
#[derive(clap::Args, Clone, Debug)]
pub struct CatalogSource {
    /// Path to catalog file (defaults to the embedded sample catalog)
    #[arg(long, env = "MEDMATCH_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Normalization rule profile for catalog names and queries
    #[arg(long, value_enum, default_value_t = NormalizationProfile::Extended)]
    pub profile: NormalizationProfile,
}

impl CatalogSource {
    /// Load the catalog once for this invocation
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read or parsed.
    pub fn load(&self) -> anyhow::Result<ReferenceCatalog> {
        let catalog = match &self.catalog {
            Some(path) => ReferenceCatalog::load_from_file(path, self.profile)?,
            None => ReferenceCatalog::load_embedded(self.profile)?,
        };
        Ok(catalog)
    }
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "MEDMATCH_PORT")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    #[command(flatten)]
    pub source: CatalogSource,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
