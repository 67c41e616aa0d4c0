//! Input parsing for `text-guards` check mode
//!
//! Parses the JSON document read from stdin.

use serde::Deserialize;

/// A candidate output to check
#[derive(Debug, Deserialize)]
pub struct CheckInput {
    /// The text to evaluate
    pub output: String,

    /// Extra protected strings for this check only (e.g. the prompt text)
    #[serde(default)]
    pub protected: Vec<String>,

    /// Optional session identifier
    #[serde(default)]
    pub session_id: Option<String>,
}

impl CheckInput {
    /// Parse input from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
