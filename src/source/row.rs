/// One data line of the source file, cells aligned with `RawTable::headers`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the source file (for diagnostics).
    pub line: u64,
    pub cells: Vec<String>,
}

impl RawRow {
    /// True if every cell in `columns` is empty or whitespace.
    pub fn is_blank_in(&self, columns: &[usize]) -> bool {
        columns.iter().all(|&i| self.cell(i).trim().is_empty())
    }

    pub fn cell(&self, idx: usize) -> &str {
        self.cells.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// The source table exactly as read: trimmed headers, untyped cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Index of the first column with this header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}
