//! Centralized input limits and validation.

/// Maximum number of rows imported from a single master sheet (DOS protection)
pub const MAX_REFERENCE_ROWS: usize = 100_000;

/// Maximum number of names matched in one batch
pub const MAX_BATCH_NAMES: usize = 1_000;

/// Maximum length of a single drug name, in characters
pub const MAX_NAME_CHARS: usize = 256;

/// Check if adding another row would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new row.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_row_limit(count: usize) -> Option<String> {
    if count >= MAX_REFERENCE_ROWS {
        Some(format!(
            "Too many rows: adding another would exceed maximum of {MAX_REFERENCE_ROWS}"
        ))
    } else {
        None
    }
}

/// Same as [`check_row_limit`] for batch name lists
#[must_use]
pub fn check_name_limit(count: usize) -> Option<String> {
    if count >= MAX_BATCH_NAMES {
        Some(format!(
            "Too many names: adding another would exceed maximum of {MAX_BATCH_NAMES}"
        ))
    } else {
        None
    }
}

/// Input validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No drug names provided")]
    EmptyBatch,
    #[error("Too many drug names: {0} exceeds maximum of {MAX_BATCH_NAMES}")]
    TooManyNames(usize),
    #[error("Drug name at index {0} exceeds {MAX_NAME_CHARS} characters")]
    NameTooLong(usize),
}

impl ValidationError {
    /// Short machine-readable kind, used in API error bodies
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyBatch => "empty_batch",
            Self::TooManyNames(_) => "too_many_names",
            Self::NameTooLong(_) => "name_too_long",
        }
    }
}

/// Validate a batch of names against the size limits
///
/// An empty batch is only rejected when `allow_empty` is false.
///
/// # Errors
///
/// Returns `ValidationError::EmptyBatch`, `ValidationError::TooManyNames` or
/// `ValidationError::NameTooLong` (with the offending index).
pub fn validate_batch<S: AsRef<str>>(names: &[S], allow_empty: bool) -> Result<(), ValidationError> {
    if names.is_empty() && !allow_empty {
        return Err(ValidationError::EmptyBatch);
    }
    if names.len() > MAX_BATCH_NAMES {
        return Err(ValidationError::TooManyNames(names.len()));
    }
    if let Some(index) = names
        .iter()
        .position(|n| n.as_ref().chars().count() > MAX_NAME_CHARS)
    {
        return Err(ValidationError::NameTooLong(index));
    }
    Ok(())
}
