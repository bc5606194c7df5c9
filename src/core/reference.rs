use serde::{Deserialize, Serialize};

use crate::core::types::{MatchedField, ReferenceId};
use crate::normalize::Normalizer;

/// A drug in the reference master list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Unique identifier
    pub id: ReferenceId,

    /// Generic (ingredient) name, e.g. `ロキソプロフェンナトリウム水和物`
    pub generic_name: String,

    /// Brand (product) name, e.g. `ロキソニン錠60mg`
    pub brand_name: String,

    /// Category from the master sheet (内用薬, 外用薬, 注射薬, ...)
    #[serde(default)]
    pub category: String,

    // === Pre-computed for matching (populated on load) ===
    #[serde(skip)]
    pub normalized_generic: String,

    #[serde(skip)]
    pub normalized_brand: String,
}

impl ReferenceEntry {
    /// Create an entry with its normalized names already computed
    pub fn new(
        id: ReferenceId,
        generic_name: impl Into<String>,
        brand_name: impl Into<String>,
        category: impl Into<String>,
        normalizer: &Normalizer,
    ) -> Self {
        let mut entry = Self {
            id,
            generic_name: generic_name.into(),
            brand_name: brand_name.into(),
            category: category.into(),
            normalized_generic: String::new(),
            normalized_brand: String::new(),
        };
        entry.rebuild_indexes(normalizer);
        entry
    }

    /// Rebuild the normalized names (call after deserialization)
    pub fn rebuild_indexes(&mut self, normalizer: &Normalizer) {
        self.normalized_generic = normalizer.normalize(&self.generic_name).normalized;
        self.normalized_brand = normalizer.normalize(&self.brand_name).normalized;
    }

    /// Raw name for a field
    #[must_use]
    pub fn name(&self, field: MatchedField) -> &str {
        match field {
            MatchedField::Generic => &self.generic_name,
            MatchedField::Brand => &self.brand_name,
        }
    }

    /// Normalized name for a field
    #[must_use]
    pub fn normalized(&self, field: MatchedField) -> &str {
        match field {
            MatchedField::Generic => &self.normalized_generic,
            MatchedField::Brand => &self.normalized_brand,
        }
    }

    /// Brand name if present, otherwise the generic name
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.brand_name.trim().is_empty() {
            &self.generic_name
        } else {
            &self.brand_name
        }
    }
}
