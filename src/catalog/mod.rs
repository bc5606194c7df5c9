//! Reference drug catalog storage and import.
//!
//! The catalog is a read-only snapshot of the drug master list. Each entry
//! carries a generic name, a brand name and a category; both names are
//! normalized once when the catalog is loaded, using the catalog's
//! [`NormalizationProfile`]. Queries must be normalized with the same profile,
//! which is why the engine takes its normalizer from the catalog.
//!
//! A small sample catalog is compiled into the binary. Full master lists are
//! imported from TSV/CSV exports with [`builder::CatalogBuilder`].
//!
//! ## Example
//!
//! ```rust
//! use medmatch::{NormalizationProfile, ReferenceCatalog};
//!
//! let catalog = ReferenceCatalog::load_embedded(NormalizationProfile::Extended).unwrap();
//! for (category, count) in catalog.category_counts() {
//!     println!("{category}: {count}");
//! }
//!
//! let hits = catalog.search("ロキソニン");
//! assert!(!hits.is_empty());
//! ```
//!
//! [`NormalizationProfile`]: crate::normalize::NormalizationProfile

pub mod builder;
pub mod store;
