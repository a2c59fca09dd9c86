//! Tabular inputs: observation exports, period cutoffs, and the program catalog.
//!
//! Every source yields a [`Table`] of raw string cells. Typing happens later, once
//! the header has been resolved against a schema.

mod cache;
mod csv_dir;

pub use cache::CachedSource;
pub use csv_dir::CsvDirectorySource;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

/// Raw named-column rows as exported from a spreadsheet.
///
/// Blank rows are kept so that row indices match the data rows of the export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_reader<R: Read>(name: &str, reader: R) -> Result<Self, SourceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|source| SourceError::Csv {
                identifier: name.to_string(),
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|source| SourceError::Csv {
                identifier: name.to_string(),
                source,
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    /// True when no row carries a value.
    pub fn is_empty(&self) -> bool {
        self.data_rows().next().is_none()
    }

    pub fn is_blank_row(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .map_or(true, |cells| cells.iter().all(|cell| cell.is_empty()))
    }

    /// Indices of the rows that carry at least one value.
    pub fn data_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.rows.len()).filter(|&row| !self.is_blank_row(row))
    }

    /// Cell at `column` of `row`; ragged rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// First `limit` rows, used when a view cannot be built and only raw data can be shown.
    pub fn preview(&self, limit: usize) -> Table {
        Table {
            name: self.name.clone(),
            headers: self.headers.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }
}

/// Anything that can hand back a table for a source identifier.
pub trait TableSource: Send + Sync {
    fn load(&self, identifier: &str) -> Result<Arc<Table>, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source '{identifier}' not found at {}", path.display())]
    NotFound { identifier: String, path: PathBuf },
    #[error("failed to read source '{identifier}': {source}")]
    Io {
        identifier: String,
        #[source]
        source: std::io::Error,
    },
    #[error("source '{identifier}' is not valid CSV: {source}")]
    Csv {
        identifier: String,
        #[source]
        source: csv::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_reader_trims_cells_and_keeps_blank_rows_in_place() {
        let table = Table::from_reader(
            "observations",
            " Marca temporal , Docente \n2024-03-15 , Ana Ruiz\n,\n2024-03-16,Luis\n".as_bytes(),
        )
        .expect("parses");

        assert_eq!(table.headers, vec!["Marca temporal", "Docente"]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.cell(0, 1), "Ana Ruiz");
        assert!(table.is_blank_row(1));
        assert_eq!(table.cell(2, 1), "Luis");
        assert_eq!(table.data_rows().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn table_with_only_blank_rows_is_empty() {
        let table = Table::from_reader("t", "a,b
,
 , 
".as_bytes()).expect("parses");
        assert_eq!(table.rows.len(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn ragged_rows_read_as_empty_cells() {
        let table = Table::from_reader("t", "a,b,c\n1\n".as_bytes()).expect("parses");
        assert_eq!(table.cell(0, 0), "1");
        assert_eq!(table.cell(0, 2), "");
        assert_eq!(table.cell(5, 0), "");
    }

    #[test]
    fn preview_keeps_headers_and_limits_rows() {
        let table = Table::from_reader("t", "a\n1\n2\n3\n".as_bytes()).expect("parses");
        let preview = table.preview(2);
        assert_eq!(preview.headers, table.headers);
        assert_eq!(preview.rows.len(), 2);
    }
}
