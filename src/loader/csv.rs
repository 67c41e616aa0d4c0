//! CSV loader
//!
//! Each row becomes one [`Document`] whose text lists `column: value` lines
//! in header order, with `source` and `row` metadata.

use std::fs::File;
use std::path::{Path, PathBuf};

use ::csv::{ReaderBuilder, StringRecord};

use crate::loader::Document;

/// Errors while loading CSV records
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("source column '{0}' not found")]
    MissingSourceColumn(String),
}

/// Loads a CSV file into documents
#[derive(Debug, Clone)]
pub struct CsvLoader {
    path: PathBuf,
    source_column: Option<String>,
    delimiter: u8,
    quote: u8,
    fieldnames: Option<Vec<String>>,
}

impl CsvLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            source_column: None,
            delimiter: b',',
            quote: b'"',
            fieldnames: None,
        }
    }

    /// Take each document's `source` from this column instead of the path
    pub fn source_column(mut self, column: impl Into<String>) -> Self {
        self.source_column = Some(column.into());
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Use these column names; the first line is then treated as data
    pub fn fieldnames<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fieldnames = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Read every row, in file order
    pub fn load(&self) -> Result<Vec<Document>, LoaderError> {
        let file = File::open(&self.path).map_err(|source| LoaderError::Io {
            path: self.path.clone(),
            source,
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .has_headers(self.fieldnames.is_none())
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = match &self.fieldnames {
            Some(names) => names.clone(),
            None => reader.headers()?.iter().map(String::from).collect(),
        };

        let source_index = match &self.source_column {
            Some(column) => Some(
                headers
                    .iter()
                    .position(|h| h == column)
                    .ok_or_else(|| LoaderError::MissingSourceColumn(column.clone()))?,
            ),
            None => None,
        };

        let default_source = self.path.display().to_string();
        let mut documents = Vec::new();

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let source = match source_index {
                Some(idx) => record.get(idx).unwrap_or_default().to_string(),
                None => default_source.clone(),
            };

            documents.push(
                Document::new(format_row(&headers, &record))
                    .with_metadata("source", source)
                    .with_metadata("row", row),
            );
        }

        Ok(documents)
    }
}

/// `column: value` lines; missing trailing fields read as empty
fn format_row(headers: &[String], record: &StringRecord) -> String {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let value = record.get(i).unwrap_or_default();
            format!("{}: {}", header.trim(), value.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
