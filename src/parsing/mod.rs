//! Parsers for the plain-text inputs the tool accepts.
//!
//! - **Drug master sheets** ([`tsv`]): TSV/CSV exports with generic name, brand
//!   name and category columns, used to build catalogs
//! - **Name lists** ([`names`]): one drug name per line, used for batch
//!   identification

use thiserror::Error;

pub mod names;
pub mod tsv;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Too many rows: {0} exceeds maximum allowed (100000)")]
    TooManyRows(usize),
}
