use std::io::Read;
use std::path::Path;

use crate::parsing::ParseError;
use crate::utils::validation::check_name_limit;

/// Split text into drug names, one per line
///
/// Blank lines and `#` comments are skipped; surrounding whitespace is kept
/// out of the names.
///
/// # Errors
///
/// Returns `ParseError::TooManyRows` if the batch limit is exceeded.
pub fn parse_name_list(text: &str) -> Result<Vec<String>, ParseError> {
    let mut names = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if check_name_limit(names.len()).is_some() {
            return Err(ParseError::TooManyRows(names.len()));
        }
        names.push(line.to_string());
    }
    Ok(names)
}

/// Read a name list from a file, or from stdin when `path` is `-`
///
/// # Errors
///
/// Returns `ParseError::Io` if the input cannot be read.
pub fn read_name_list(path: &Path) -> Result<Vec<String>, ParseError> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    parse_name_list(&content)
}
