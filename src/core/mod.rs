//! Core data types for drug-name matching.
//!
//! - [`ReferenceEntry`]: one drug in the reference master list, with its names
//!   pre-normalized at load time
//! - [`ReferenceId`]: catalog-unique entry identifier
//! - [`MatchStatus`]: classification of a best-match score
//! - [`MatchedField`]: which of an entry's names produced a score
//!
//! [`ReferenceEntry`]: reference::ReferenceEntry
//! [`ReferenceId`]: types::ReferenceId
//! [`MatchStatus`]: types::MatchStatus
//! [`MatchedField`]: types::MatchedField

pub mod reference;
pub mod types;
