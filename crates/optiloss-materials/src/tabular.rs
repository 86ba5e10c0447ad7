//! Parser for comma-separated numeric tables.
//!
//! Optical-constant and spectrum files share one plain-text layout:
//! ```text
//! # optional comment lines
//! "λ,n (nm)",n,k
//! 300,1.487,0
//! 310,1.484,0
//! ```
//! The header row is optional. Header fields may be double-quoted, which
//! allows a comma inside a column name (the PV Lighthouse export does this).
//! Blank lines and lines starting with `#` are skipped.

use std::path::Path;

use crate::provider::MaterialError;

/// Selects one column of a table by header name.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// Human-readable role used in error messages (e.g. "wavelength").
    pub role: &'static str,
    /// Position used when the file has no header row.
    pub fallback_index: usize,
    /// Predicate on the trimmed, lowercased header name.
    pub matches: fn(&str) -> bool,
}

/// Numeric columns extracted from a table, one `Vec` per requested column.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<Vec<f64>>,
    /// 1-based source line of each row, for error reporting.
    pub lines: Vec<usize>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sort all columns by the values of column `key`, ascending.
    ///
    /// Returns a `DataFormat` error naming both lines if two rows share the
    /// same key.
    pub fn sort_by_column(&mut self, key: usize) -> Result<(), MaterialError> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.columns[key][a].total_cmp(&self.columns[key][b]));

        for pair in order.windows(2) {
            if self.columns[key][pair[0]] == self.columns[key][pair[1]] {
                return Err(MaterialError::DataFormat {
                    line: self.lines[pair[1]].max(self.lines[pair[0]]),
                    message: format!(
                        "Duplicate sample {} (also on line {})",
                        self.columns[key][pair[0]],
                        self.lines[pair[1]].min(self.lines[pair[0]])
                    ),
                });
            }
        }

        self.columns = self
            .columns
            .iter()
            .map(|col| order.iter().map(|&i| col[i]).collect())
            .collect();
        self.lines = order.iter().map(|&i| self.lines[i]).collect();
        Ok(())
    }
}

/// Split one CSV record, honouring double-quoted fields.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

fn is_skippable(line: &str) -> bool {
    let t = line.trim();
    t.is_empty() || t.starts_with('#')
}

/// Parse `content` and extract the requested columns.
///
/// The first non-comment line is treated as a header if any of its fields
/// fails to parse as a number.
pub fn parse_table(content: &str, specs: &[ColumnSpec]) -> Result<Table, MaterialError> {
    // Spreadsheet exports often start with a UTF-8 byte-order mark.
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut rows = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !is_skippable(l))
        .peekable();

    let first = rows.peek().map(|(line_no, l)| (*line_no, split_record(l)));
    let (indices, header_line) = match first {
        None => {
            return Err(MaterialError::DataFormat {
                line: 1,
                message: "Table contains no data".into(),
            })
        }
        Some((line_no, fields)) if fields.iter().any(|f| f.parse::<f64>().is_err()) => {
            let names: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();
            let indices = specs
                .iter()
                .map(|spec| {
                    names
                        .iter()
                        .position(|name| (spec.matches)(name))
                        .ok_or_else(|| MaterialError::DataFormat {
                            line: line_no,
                            message: format!(
                                "Missing {} column (header: {})",
                                spec.role,
                                fields.join(", ")
                            ),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            (indices, Some(line_no))
        }
        Some(_) => (specs.iter().map(|s| s.fallback_index).collect(), None),
    };

    if header_line.is_some() {
        rows.next();
    }

    let mut table = Table {
        columns: vec![Vec::new(); specs.len()],
        lines: Vec::new(),
    };

    for (line_no, line) in rows {
        let fields = split_record(line);
        for (col, (&idx, spec)) in indices.iter().zip(specs).enumerate() {
            let raw = fields.get(idx).ok_or_else(|| MaterialError::DataFormat {
                line: line_no,
                message: format!("Missing {} value (expected column {})", spec.role, idx + 1),
            })?;
            let value: f64 = raw.parse().map_err(|_| MaterialError::DataFormat {
                line: line_no,
                message: format!("Invalid {} value: '{}'", spec.role, raw),
            })?;
            if !value.is_finite() {
                return Err(MaterialError::DataFormat {
                    line: line_no,
                    message: format!("Non-finite {} value: '{}'", spec.role, raw),
                });
            }
            table.columns[col].push(value);
        }
        table.lines.push(line_no);
    }

    if table.is_empty() {
        return Err(MaterialError::DataFormat {
            line: header_line.unwrap_or(1),
            message: "Table has a header but no data rows".into(),
        });
    }

    Ok(table)
}

/// Read a file and parse it with [`parse_table`].
pub fn read_table(path: &Path, specs: &[ColumnSpec]) -> Result<Table, MaterialError> {
    let content = std::fs::read_to_string(path).map_err(|source| MaterialError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_table(&content, specs)
}
