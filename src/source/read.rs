use crate::source::row::{RawRow, RawTable};
use anyhow::{Context, bail};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Candidate delimiters, in order of preference on a tie.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Read a delimited file into a raw table.
///
/// The delimiter is sniffed from the header line unless one is given.
/// Fails only when the file as a whole cannot be read.
pub fn read_table(path: &Path, delimiter: Option<u8>) -> anyhow::Result<RawTable> {
    let bytes = fs::read(path).with_context(|| format!("read input file {}", path.display()))?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("input file {} is not valid UTF-8", path.display()))?;

    parse_table(&text, delimiter).with_context(|| format!("parse input file {}", path.display()))
}

/// Parse delimited text into a raw table.
///
/// Headers are trimmed. Rows shorter than the header are padded with empty
/// cells; surplus cells are discarded.
pub fn parse_table(text: &str, delimiter: Option<u8>) -> anyhow::Result<RawTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(text));
    debug!(delimiter = %char::from(delimiter).escape_default(), "reading table");

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .context("cannot read header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("no header row found");
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.context("malformed delimited data")?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() > headers.len() {
            debug!(line, cells = record.len(), "discarding cells beyond the header width");
        }

        let mut cells: Vec<String> = record
            .iter()
            .take(headers.len())
            .map(str::to_string)
            .collect();
        cells.resize(headers.len(), String::new());

        rows.push(RawRow { line, cells });
    }

    Ok(RawTable { headers, rows })
}

/// Pick the candidate delimiter occurring most often in the first line.
fn detect_delimiter(text: &str) -> u8 {
    let first_line = text.lines().next().unwrap_or("");

    let mut best = DELIMITERS[0];
    let mut best_count = 0;
    for &sep in &DELIMITERS {
        let count = first_line.bytes().filter(|&b| b == sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn headers_are_trimmed_and_short_rows_padded() {
        let table = parse_table(" a , b ,c\n1,2\n", None).unwrap();

        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].cells, vec!["1", "2", ""]);
        assert_eq!(table.rows[0].line, 2);
    }

    #[test]
    fn surplus_cells_are_dropped() {
        let table = parse_table("a,b\n1,2,3,4\n", None).unwrap();
        assert_eq!(table.rows[0].cells, vec!["1", "2"]);
    }

    #[test]
    fn quoted_fields_keep_delimiters() {
        let table = parse_table("name,city\n\"Phone, Pro\",Pune\n", None).unwrap();
        assert_eq!(table.rows[0].cell(0), "Phone, Pro");
        assert_eq!(table.rows[0].cell(1), "Pune");
    }

    #[test]
    fn delimiter_is_detected() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a|b"), b'|');
        assert_eq!(detect_delimiter("a,b;c,d"), b',');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn explicit_delimiter_wins() {
        let table = parse_table("a;b,c\n1;2,3\n", Some(b';')).unwrap();
        assert_eq!(table.headers, vec!["a", "b,c"]);
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let table = parse_table("\u{feff}Product_Name,City\nX,Y\n", None).unwrap();
        assert_eq!(table.column("Product_Name"), Some(0));
    }

    #[test]
    fn empty_input_is_fatal() {
        assert!(parse_table("", None).is_err());
        assert!(parse_table("\n\n", None).is_err());
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = read_table(Path::new("/definitely/not/here.csv"), None).unwrap_err();
        assert!(format!("{:#}", err).contains("/definitely/not/here.csv"));
    }
}
