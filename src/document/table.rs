//! Pipe tables.

use regex::Regex;
use std::sync::LazyLock;

static RE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\|?[ \t]*:?-+:?[ \t]*(\|[ \t]*:?-+:?[ \t]*)*\|?$").unwrap()
});

/// A pipe table with unique, ordered headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

/// One body row. Holds at most one cell per header; a short row simply has
/// fewer cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Table {
    /// Build a table from its header line and body lines. Returns `None` when
    /// the header line has no cells.
    pub(crate) fn from_lines(header: &str, body: &[String]) -> Option<Table> {
        let mut headers: Vec<String> = Vec::new();
        // Index into `headers` for every raw column; `None` drops a duplicate.
        let mut columns: Vec<Option<usize>> = Vec::new();
        for cell in split_row(header) {
            if headers.iter().any(|h| h.eq_ignore_ascii_case(&cell)) {
                columns.push(None);
            } else {
                columns.push(Some(headers.len()));
                headers.push(cell);
            }
        }
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return None;
        }

        let rows = body
            .iter()
            .map(|line| Row::from_cells(split_row(line), &columns, headers.len()))
            .collect();

        Some(Table { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Column index of `name`, compared case-insensitively.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    /// True if every name in `names` is a header of this table.
    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.column(name).is_some())
    }

    /// Cell of `row` under header `name`, if both exist.
    pub fn cell<'t>(&self, row: &'t Row, name: &str) -> Option<&'t str> {
        self.column(name).and_then(|index| row.get(index))
    }
}

impl Row {
    fn from_cells(raw: Vec<String>, columns: &[Option<usize>], width: usize) -> Row {
        let mut cells: Vec<String> = Vec::with_capacity(width);
        for (i, cell) in raw.into_iter().enumerate() {
            match columns.get(i) {
                Some(Some(_)) => cells.push(cell),
                Some(None) => {}
                None => {
                    // Overflow folds into the last column.
                    let full = cells.len() == width;
                    match cells.last_mut() {
                        Some(last) if full => {
                            last.push_str(" | ");
                            last.push_str(&cell);
                        }
                        _ => cells.push(cell),
                    }
                }
            }
        }
        Row { cells }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// True for a candidate table row.
pub(crate) fn is_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// True for a `|---|:--:|` separator line.
pub(crate) fn is_separator(line: &str) -> bool {
    RE_SEPARATOR.is_match(line.trim())
}

/// Split a row into trimmed cells on unescaped pipes. `\|` is a literal pipe.
pub(crate) fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = match line.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => line,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn separator_shapes() {
        assert!(is_separator("|---|---|"));
        assert!(is_separator("| :--- | ---: |"));
        assert!(is_separator("---|---"));
        assert!(is_separator("|:-:|"));
        assert!(!is_separator("| a | b |"));
        assert!(!is_separator("| - x - |"));
        assert!(!is_separator(""));
    }

    #[test]
    fn split_handles_escaped_pipes() {
        assert_eq!(split_row("| a | b \\| c |"), vec!["a", "b | c"]);
        assert_eq!(split_row("a|b"), vec!["a", "b"]);
    }

    #[test]
    fn short_rows_leave_cells_absent() {
        let table = Table::from_lines("| Field | Type | Description |", &body(&["| id | snowflake |"]))
            .unwrap();
        let row = &table.rows()[0];
        assert_eq!(table.cell(row, "field"), Some("id"));
        assert_eq!(table.cell(row, "TYPE"), Some("snowflake"));
        assert_eq!(table.cell(row, "description"), None);
    }

    #[test]
    fn long_rows_fold_into_last_column() {
        let table = Table::from_lines("| Name | Value |", &body(&["| A | 1 | extra |"])).unwrap();
        assert_eq!(table.rows()[0].cells(), &["A".to_string(), "1 | extra".to_string()]);
    }

    #[test]
    fn duplicate_headers_keep_first_column() {
        let table = Table::from_lines("| Name | Name | Value |", &body(&["| a | b | 1 |"])).unwrap();
        assert_eq!(table.headers(), &["Name".to_string(), "Value".to_string()]);
        let row = &table.rows()[0];
        assert_eq!(table.cell(row, "name"), Some("a"));
        assert_eq!(table.cell(row, "value"), Some("1"));
    }

    #[test]
    fn header_line_without_cells_is_rejected() {
        assert!(Table::from_lines("|", &[]).is_none());
    }
}
