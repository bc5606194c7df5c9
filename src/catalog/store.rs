use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

use crate::core::reference::ReferenceEntry;
use crate::core::types::ReferenceId;
use crate::normalize::{NormalizationProfile, Normalizer};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub created_at: String,
    /// Profile the catalog was exported with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<NormalizationProfile>,
    pub references: Vec<ReferenceEntry>,
}

/// Anything that can hand over the full reference set
pub trait ReferenceProvider {
    fn load_all(&self) -> Vec<ReferenceEntry>;
}

impl ReferenceProvider for [ReferenceEntry] {
    fn load_all(&self) -> Vec<ReferenceEntry> {
        self.to_vec()
    }
}

impl ReferenceProvider for Vec<ReferenceEntry> {
    fn load_all(&self) -> Vec<ReferenceEntry> {
        self.clone()
    }
}

/// Read-only snapshot of the drug master list, normalized with one profile
#[derive(Debug)]
pub struct ReferenceCatalog {
    /// All entries, in file order (the matcher's scan order)
    pub references: Vec<ReferenceEntry>,

    /// Index: reference ID -> index in references vec
    id_to_index: HashMap<ReferenceId, usize>,

    normalizer: Normalizer,
}

impl ReferenceCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new(profile: NormalizationProfile) -> Self {
        Self {
            references: Vec::new(),
            id_to_index: HashMap::new(),
            normalizer: Normalizer::new(profile),
        }
    }

    /// Load the embedded sample catalog
    pub fn load_embedded(profile: NormalizationProfile) -> Result<Self, CatalogError> {
        // Validated at compile time by build.rs
        const EMBEDDED_CATALOG: &str = include_str!("../../catalogs/sample_medicines.json");
        Self::from_json(EMBEDDED_CATALOG, profile)
    }

    /// Load catalog from a JSON file
    pub fn load_from_file(path: &Path, profile: NormalizationProfile) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content, profile)?;
        tracing::info!(
            path = %path.display(),
            references = catalog.len(),
            %profile,
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse catalog from JSON string
    pub fn from_json(json: &str, profile: NormalizationProfile) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            tracing::warn!(
                expected = CATALOG_VERSION,
                found = %data.version,
                "catalog version mismatch"
            );
        }
        if let Some(exported) = data.profile.filter(|p| *p != profile) {
            tracing::debug!(%exported, requested = %profile, "re-normalizing catalog with requested profile");
        }

        let mut catalog = Self::new(profile);
        for reference in data.references {
            catalog.add_reference(reference);
        }

        Ok(catalog)
    }

    /// Snapshot the references of any provider
    pub fn from_provider<P: ReferenceProvider + ?Sized>(provider: &P, profile: NormalizationProfile) -> Self {
        let mut catalog = Self::new(profile);
        for reference in provider.load_all() {
            catalog.add_reference(reference);
        }
        catalog
    }

    /// Add a reference, normalizing its names with the catalog's profile
    pub fn add_reference(&mut self, mut reference: ReferenceEntry) {
        reference.rebuild_indexes(&self.normalizer);

        let index = self.references.len();
        if self.id_to_index.insert(reference.id, index).is_some() {
            tracing::warn!(id = %reference.id, "duplicate reference id, lookups return the later entry");
        }
        self.references.push(reference);
    }

    /// Get a reference by ID
    #[must_use]
    pub fn get(&self, id: ReferenceId) -> Option<&ReferenceEntry> {
        self.id_to_index.get(&id).map(|&idx| &self.references[idx])
    }

    /// The normalizer every query against this catalog must use
    #[must_use]
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    #[must_use]
    pub fn profile(&self) -> NormalizationProfile {
        self.normalizer.profile()
    }

    /// Entries whose normalized generic or brand name contains the normalized keyword
    #[must_use]
    pub fn search(&self, keyword: &str) -> Vec<&ReferenceEntry> {
        let needle = self.normalizer.normalize(keyword).normalized;
        if needle.is_empty() {
            return Vec::new();
        }
        self.references
            .iter()
            .filter(|r| r.normalized_generic.contains(&needle) || r.normalized_brand.contains(&needle))
            .collect()
    }

    /// Number of entries per category, sorted by category
    #[must_use]
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for reference in &self.references {
            *counts.entry(reference.category.as_str()).or_default() += 1;
        }
        counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    /// The id one past the highest id in use
    #[must_use]
    pub fn next_id(&self) -> ReferenceId {
        ReferenceId(self.references.iter().map(|r| r.id.0 + 1).max().unwrap_or(1))
    }

    /// Export catalog to JSON
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            profile: Some(self.profile()),
            references: self.references.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of references in catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// Check if catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

impl Default for ReferenceCatalog {
    fn default() -> Self {
        Self::new(NormalizationProfile::default())
    }
}

impl ReferenceProvider for ReferenceCatalog {
    fn load_all(&self) -> Vec<ReferenceEntry> {
        self.references.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, generic: &str, brand: &str, category: &str) -> ReferenceEntry {
        ReferenceEntry::new(ReferenceId(id), generic, brand, category, &Normalizer::default())
    }

    #[test]
    fn test_load_embedded_catalog() {
        let catalog = ReferenceCatalog::load_embedded(NormalizationProfile::Extended).unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog
            .references
            .iter()
            .all(|r| !r.normalized_generic.is_empty() && !r.normalized_brand.is_empty()));
    }

    #[test]
    fn test_catalog_get_by_id() {
        let catalog = ReferenceCatalog::load_embedded(NormalizationProfile::Extended).unwrap();

        let loxonin = catalog.get(ReferenceId(1)).unwrap();
        assert_eq!(loxonin.brand_name, "ロキソニン錠60mg");
        assert_eq!(loxonin.normalized_brand, "ロキソニン");
        assert!(catalog.get(ReferenceId(9999)).is_none());
    }

    #[test]
    fn test_profile_controls_normalization() {
        let json = r#"{
            "version": "1.0.0",
            "created_at": "2024-01-01T00:00:00Z",
            "references": [{"id": 1, "generic_name": "シアノコバラミン", "brand_name": "ビタミンB12", "category": "注射薬"}]
        }"#;
        let standard = ReferenceCatalog::from_json(json, NormalizationProfile::Standard).unwrap();
        let extended = ReferenceCatalog::from_json(json, NormalizationProfile::Extended).unwrap();
        assert_eq!(standard.references[0].normalized_brand, "ビタミンb12");
        assert_eq!(extended.references[0].normalized_brand, "ビタミンb");
        assert_eq!(extended.profile(), NormalizationProfile::Extended);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = ReferenceCatalog::from_json("{not json", NormalizationProfile::Standard).unwrap_err();
        assert!(matches!(err, CatalogError::ParseError(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = ReferenceCatalog::load_from_file(
            Path::new("/nonexistent/catalog.json"),
            NormalizationProfile::Standard,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::ReadError(_)));
    }

    #[test]
    fn test_to_json_round_trips_raw_fields() {
        let mut catalog = ReferenceCatalog::default();
        catalog.add_reference(entry(3, "ファモチジン", "ガスター錠20mg", "内用薬"));
        let json = catalog.to_json().unwrap();

        assert!(json.contains("\"version\""));
        assert!(json.contains("\"profile\": \"extended\""));
        assert!(!json.contains("normalized_brand"));

        let reloaded = ReferenceCatalog::from_json(&json, NormalizationProfile::Extended).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.references[0].normalized_brand, "ガスター");
    }

    #[test]
    fn test_search_and_category_counts() {
        let mut catalog = ReferenceCatalog::default();
        catalog.add_reference(entry(1, "アムロジピンベシル酸塩", "アムロジンOD錠5mg", "内用薬"));
        catalog.add_reference(entry(2, "アムロジピンベシル酸塩", "アムロジピン錠5mg「サワイ」", "内用薬"));
        catalog.add_reference(entry(3, "白色ワセリン", "プロペト", "外用薬"));

        let hits = catalog.search("アムロジ");
        assert_eq!(hits.len(), 2);
        assert!(catalog.search("錠").is_empty());
        assert!(catalog.search("").is_empty());

        assert_eq!(
            catalog.category_counts(),
            vec![("内用薬".to_string(), 2), ("外用薬".to_string(), 1)]
        );
        assert_eq!(catalog.next_id(), ReferenceId(4));
    }

    #[test]
    fn test_from_provider() {
        let entries = vec![
            entry(10, "センノシド", "プルゼニド錠12mg", "内用薬"),
            entry(11, "エスゾピクロン", "ルネスタ錠1mg", "内用薬"),
        ];
        let catalog = ReferenceCatalog::from_provider(&entries, NormalizationProfile::Standard);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(ReferenceId(11)).unwrap().normalized_brand, "ルネスタ");
        assert_eq!(catalog.load_all().len(), 2);
        assert_eq!(ReferenceCatalog::default().next_id(), ReferenceId(1));
    }
}
