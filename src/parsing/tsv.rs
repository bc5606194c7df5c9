use std::path::Path;

use csv::StringRecord;

use crate::parsing::ParseError;
use crate::utils::validation::check_row_limit;

/// One row of a drug master sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRow {
    pub generic_name: String,
    pub brand_name: String,
    pub category: String,
}

/// Column positions resolved from a header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    generic: usize,
    brand: usize,
    category: Option<usize>,
}

impl Columns {
    const POSITIONAL: Self = Self {
        generic: 0,
        brand: 1,
        category: Some(2),
    };

    /// Recognise a header record; `None` means the record is data
    fn from_header(record: &StringRecord) -> Option<Self> {
        let find = |names: &[&str]| {
            record
                .iter()
                .position(|f| names.iter().any(|n| f.eq_ignore_ascii_case(n)))
        };
        let generic = find(&["成分名", "generic_name", "generic"]);
        let brand = find(&["品名", "brand_name", "brand"]);
        let category = find(&["区分", "category"]);

        match (generic, brand) {
            (Some(generic), Some(brand)) => Some(Self {
                generic,
                brand,
                category,
            }),
            _ => None,
        }
    }

    fn min_fields(self) -> usize {
        self.generic.max(self.brand) + 1
    }
}

/// Delimiter implied by a file extension (`.csv` is comma, anything else tab)
#[must_use]
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

/// Parse a TSV/CSV drug master file, choosing the delimiter by extension
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_reference_file(path: &Path) -> Result<Vec<ReferenceRow>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_reference_text(&content, delimiter_for(path))
}

/// Parse TSV/CSV text with columns: generic name, brand name, [category]
///
/// Fields may be quoted as in RFC 4180. A header naming `成分名`/`generic_name`
/// and `品名`/`brand_name` (and optionally `区分`/`category`) may put the
/// columns in any order; without one the columns are positional. Lines
/// starting with `#` are comments.
///
/// # Errors
///
/// Returns `ParseError::Csv` for malformed quoting, `ParseError::InvalidFormat`
/// if a record has too few fields or no rows are found, or
/// `ParseError::TooManyRows` if the limit is exceeded.
pub fn parse_reference_text(text: &str, delimiter: u8) -> Result<Vec<ReferenceRow>, ParseError> {
    // A UTF-8 BOM is common in spreadsheet exports
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    let mut columns = Columns::POSITIONAL;
    let mut first_record = true;

    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        if first_record {
            first_record = false;
            if let Some(header) = Columns::from_header(&record) {
                columns = header;
                continue;
            }
        }

        if record.len() < columns.min_fields() {
            let line = record.position().map_or(0, csv::Position::line);
            return Err(ParseError::InvalidFormat(format!(
                "Line {line} has {} fields, expected at least {}",
                record.len(),
                columns.min_fields()
            )));
        }

        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        let row = ReferenceRow {
            generic_name: field(columns.generic),
            brand_name: field(columns.brand),
            category: columns.category.map(field).unwrap_or_default(),
        };
        if row.generic_name.is_empty() && row.brand_name.is_empty() {
            continue;
        }

        if check_row_limit(rows.len()).is_some() {
            return Err(ParseError::TooManyRows(rows.len()));
        }

        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ParseError::InvalidFormat("No rows found in file".to_string()));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_japanese_header_any_order() {
        let tsv = "区分\t品名\t成分名\n内用薬\tロキソニン錠60mg\tロキソプロフェンナトリウム水和物\n外用薬\tプロペト\t白色ワセリン\n";

        let rows = parse_reference_text(tsv, b'\t').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].generic_name, "ロキソプロフェンナトリウム水和物");
        assert_eq!(rows[0].brand_name, "ロキソニン錠60mg");
        assert_eq!(rows[1].category, "外用薬");
    }

    #[test]
    fn test_parse_csv_english_header_without_category() {
        let csv = "\u{FEFF}generic_name,brand_name\nファモチジン,ガスター錠20mg\n";
        let rows = parse_reference_text(csv, b',').unwrap();
        assert_eq!(
            rows,
            vec![ReferenceRow {
                generic_name: "ファモチジン".to_string(),
                brand_name: "ガスター錠20mg".to_string(),
                category: String::new(),
            }]
        );
    }

    #[test]
    fn test_parse_positional_with_comments_and_blank_rows() {
        let tsv = "# exported 2024-06\nセンノシド\tプルゼニド錠12mg\t内用薬\n\t\t注射薬\n\nエスゾピクロン\tルネスタ錠1mg\n";
        let rows = parse_reference_text(tsv, b'\t').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].brand_name, "ルネスタ錠1mg");
        assert_eq!(rows[1].category, "");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_reference_text("onlyonefield\n", b'\t'),
            Err(ParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_reference_text("成分名\t品名\n", b'\t'),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_delimiter_for() {
        assert_eq!(delimiter_for(Path::new("master.CSV")), b',');
        assert_eq!(delimiter_for(Path::new("master.tsv")), b'\t');
        assert_eq!(delimiter_for(Path::new("master")), b'\t');
    }

    #[test]
    fn test_parse_quoted_fields_with_delimiters() {
        let csv = "成分名,品名,区分\n\"アムロジピンベシル酸塩\",\"アムロジン錠2.5mg, 5mg\",内用薬\n\"ワセリン \"\"白色\"\"\",プロペト,外用薬\n";
        let rows = parse_reference_text(csv, b',').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].generic_name, "アムロジピンベシル酸塩");
        assert_eq!(rows[0].brand_name, "アムロジン錠2.5mg, 5mg");
        assert_eq!(rows[0].category, "内用薬");
        assert_eq!(rows[1].generic_name, "ワセリン \"白色\"");
    }

    #[test]
    fn test_parse_reports_short_record_line() {
        let tsv = "成分名\t品名\nファモチジン\tガスター錠20mg\nセンノシド\n";
        let err = parse_reference_text(tsv, b'\t').unwrap_err();
        assert!(err.to_string().contains("Line 3"), "{err}");
    }
}
