//! Catalog builder for importing drug master sheets.
//!
//! The `CatalogBuilder` collects rows from one or more TSV/CSV exports,
//! assigns sequential ids and produces a [`ReferenceCatalog`] normalized with
//! the chosen profile. Starting from an existing catalog appends after its
//! highest id.

use std::path::Path;
use thiserror::Error;

use crate::catalog::store::ReferenceCatalog;
use crate::core::reference::ReferenceEntry;
use crate::core::types::ReferenceId;
use crate::normalize::{NormalizationProfile, Normalizer};
use crate::parsing::tsv::{parse_reference_file, ReferenceRow};
use crate::parsing::ParseError;
use crate::utils::validation::MAX_REFERENCE_ROWS;

#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("Catalog would hold {0} entries, more than the maximum of {MAX_REFERENCE_ROWS}")]
    TooManyEntries(usize),
}

/// Record of a processed input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub path: String,
    pub rows_added: usize,
}

/// Builder that collates master-sheet rows into a catalog
#[derive(Debug)]
pub struct CatalogBuilder {
    normalizer: Normalizer,
    entries: Vec<ReferenceEntry>,
    next_id: ReferenceId,
    inputs_processed: Vec<InputRecord>,
}

impl CatalogBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new(profile: NormalizationProfile) -> Self {
        Self {
            normalizer: Normalizer::new(profile),
            entries: Vec::new(),
            next_id: ReferenceId(1),
            inputs_processed: Vec::new(),
        }
    }

    /// Start from an existing catalog; new rows get ids after its highest id
    #[must_use]
    pub fn from_catalog(catalog: &ReferenceCatalog) -> Self {
        Self {
            normalizer: *catalog.normalizer(),
            entries: catalog.references.clone(),
            next_id: catalog.next_id(),
            inputs_processed: Vec::new(),
        }
    }

    /// Append parsed rows, returning how many were added
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::TooManyEntries` if the catalog would exceed the
    /// row limit; nothing is added in that case.
    pub fn add_rows(&mut self, rows: Vec<ReferenceRow>) -> Result<usize, BuilderError> {
        let total = self.entries.len() + rows.len();
        if total > MAX_REFERENCE_ROWS {
            return Err(BuilderError::TooManyEntries(total));
        }

        let added = rows.len();
        for row in rows {
            let entry = ReferenceEntry::new(
                self.next_id,
                row.generic_name,
                row.brand_name,
                row.category,
                &self.normalizer,
            );
            self.next_id = ReferenceId(self.next_id.0 + 1);
            self.entries.push(entry);
        }
        Ok(added)
    }

    /// Parse a TSV/CSV file and append its rows
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::Parse` if the file cannot be read or parsed, or
    /// `BuilderError::TooManyEntries` if the row limit would be exceeded.
    pub fn add_input(&mut self, path: &Path) -> Result<usize, BuilderError> {
        let rows = parse_reference_file(path).map_err(|source| BuilderError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        let rows_added = self.add_rows(rows)?;

        tracing::info!(path = %path.display(), rows = rows_added, "imported master sheet");
        self.inputs_processed.push(InputRecord {
            path: path.display().to_string(),
            rows_added,
        });
        Ok(rows_added)
    }

    #[must_use]
    pub fn inputs(&self) -> &[InputRecord] {
        &self.inputs_processed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish into a catalog snapshot
    #[must_use]
    pub fn build(self) -> ReferenceCatalog {
        ReferenceCatalog::from_provider(&self.entries, self.normalizer.profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn row(generic: &str, brand: &str) -> ReferenceRow {
        ReferenceRow {
            generic_name: generic.to_string(),
            brand_name: brand.to_string(),
            category: "内用薬".to_string(),
        }
    }

    #[test]
    fn test_sequential_ids() {
        let mut builder = CatalogBuilder::new(NormalizationProfile::Extended);
        let added = builder
            .add_rows(vec![row("ファモチジン", "ガスター錠20mg"), row("レバミピド", "ムコスタ錠100mg")])
            .unwrap();
        assert_eq!(added, 2);

        let catalog = builder.build();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(ReferenceId(2)).unwrap().normalized_brand, "ムコスタ");
    }

    #[test]
    fn test_append_continues_after_highest_id() {
        let existing = ReferenceCatalog::load_embedded(NormalizationProfile::Extended).unwrap();
        let before = existing.len();
        let next = existing.next_id();

        let mut builder = CatalogBuilder::from_catalog(&existing);
        builder.add_rows(vec![row("プレガバリン", "リリカOD錠75mg")]).unwrap();
        let catalog = builder.build();

        assert_eq!(catalog.len(), before + 1);
        assert_eq!(catalog.get(next).unwrap().normalized_brand, "リリカ");
    }

    #[test]
    fn test_add_input_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "成分名,品名,区分").unwrap();
        writeln!(file, "センノシド,プルゼニド錠12mg,内用薬").unwrap();
        writeln!(file, "白色ワセリン,プロペト,外用薬").unwrap();

        let mut builder = CatalogBuilder::new(NormalizationProfile::Standard);
        assert_eq!(builder.add_input(file.path()).unwrap(), 2);
        assert_eq!(builder.inputs().len(), 1);
        assert_eq!(builder.inputs()[0].rows_added, 2);

        let catalog = builder.build();
        assert_eq!(catalog.profile(), NormalizationProfile::Standard);
        assert_eq!(catalog.category_counts().len(), 2);
    }

    #[test]
    fn test_add_input_reports_path() {
        let mut builder = CatalogBuilder::new(NormalizationProfile::Extended);
        let err = builder.add_input(Path::new("/nonexistent/master.tsv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/master.tsv"));
        assert!(builder.is_empty());
    }
}
