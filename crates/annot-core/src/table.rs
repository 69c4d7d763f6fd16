//! # Observed Tables
//!
//! The dataset side of validation: a set of named columns whose values are
//! compared against a dictionary. Values are kept as the literal text they
//! were read as; no type coercion or whitespace normalization happens here
//! or anywhere downstream.
//!
//! Missing cells (empty CSV fields, JSON `null`) are represented as `None`
//! and never count as observed values.

use std::collections::{BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// A column-oriented table of optional string cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RowMajorTable", into = "RowMajorTable")]
pub struct ObservedTable {
    names: Vec<String>,
    columns: Vec<Vec<Option<String>>>,
    rows: usize,
}

/// Serialized form: a header plus rows, which is how snapshot files and
/// remote tables are laid out.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RowMajorTable {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Option<String>>>,
}

impl ObservedTable {
    /// Build a table from `(name, cells)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateColumn`] if two columns share a name and
    /// [`TableError::RaggedColumn`] if the columns differ in length.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (S, Vec<Option<String>>)>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut cells = Vec::new();
        let mut seen = HashSet::new();
        let mut rows = None;

        for (name, column) in columns {
            let name = name.into();
            if !seen.insert(name.clone()) {
                return Err(TableError::DuplicateColumn(name));
            }
            let expected = *rows.get_or_insert(column.len());
            if column.len() != expected {
                return Err(TableError::RaggedColumn {
                    column: name,
                    expected,
                    actual: column.len(),
                });
            }
            names.push(name);
            cells.push(column);
        }

        Ok(Self {
            names,
            columns: cells,
            rows: rows.unwrap_or(0),
        })
    }

    /// Convenience constructor for tests and literals: every cell present.
    ///
    /// # Errors
    ///
    /// Same as [`from_columns`](Self::from_columns).
    pub fn from_str_columns<'a, I>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
    {
        Self::from_columns(columns.into_iter().map(|(name, cells)| {
            (name, cells.into_iter().map(|c| Some(c.to_string())).collect::<Vec<_>>())
        }))
    }

    /// Read a delimited file with a header row.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Csv`] for malformed input (including records with
    /// a different field count than the header) and
    /// [`TableError::DuplicateColumn`] for repeated header names.
    pub fn from_csv_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

        for record in reader.records() {
            let record = record?;
            for (column, cell) in columns.iter_mut().zip(record.iter()) {
                column.push(if cell.is_empty() {
                    None
                } else {
                    Some(cell.to_string())
                });
            }
        }

        Self::from_columns(headers.into_iter().zip(columns))
    }

    /// Read a `.csv` or `.tsv` file; the delimiter follows the extension.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Io`] if the file cannot be opened, otherwise as
    /// [`from_csv_reader`](Self::from_csv_reader).
    pub fn from_csv_path(path: &Path) -> Result<Self, TableError> {
        let file = std::fs::File::open(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_reader(file, delimiter_for_path(path))
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns true if the table has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Cells of a column, if present.
    pub fn column(&self, name: &str) -> Option<&[Option<String>]> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.columns.get(i))
            .map(Vec::as_slice)
    }

    /// Distinct present values of a column, if the column exists.
    pub fn unique_values(&self, name: &str) -> Option<BTreeSet<&str>> {
        self.column(name)
            .map(|cells| cells.iter().flatten().map(String::as_str).collect())
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.names.len()
    }
}

impl TryFrom<RowMajorTable> for ObservedTable {
    type Error = TableError;

    fn try_from(raw: RowMajorTable) -> Result<Self, Self::Error> {
        let width = raw.columns.len();
        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(raw.rows.len()); width];
        for (i, row) in raw.rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(TableError::RaggedColumn {
                    column: format!("(row {i})"),
                    expected: width,
                    actual: row.len(),
                });
            }
            for (column, cell) in columns.iter_mut().zip(row) {
                column.push(cell);
            }
        }
        Self::from_columns(raw.columns.into_iter().zip(columns))
    }
}

impl From<ObservedTable> for RowMajorTable {
    fn from(table: ObservedTable) -> Self {
        let rows = (0..table.rows)
            .map(|r| {
                table
                    .columns
                    .iter()
                    .map(|column| column.get(r).cloned().flatten())
                    .collect()
            })
            .collect();
        Self {
            columns: table.names,
            rows,
        }
    }
}

/// Field delimiter for a delimited-text file: tab for `.tsv`, comma for
/// anything else.
pub fn delimiter_for_path(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}
