//! Record sources that feed documents to text pipelines
//!
//! Loaders turn rows of an external source into uniform documents: a block
//! of text plus metadata naming where it came from.

pub mod csv;

use serde::Serialize;
use serde_json::{Map, Value};

pub use self::csv::{CsvLoader, LoaderError};

/// Text plus metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub page_content: String,
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Serialize to a single JSON line
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
