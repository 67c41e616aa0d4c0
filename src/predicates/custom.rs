//! Caller-supplied predicates

use regex::RegexSet;

use crate::error::{GuardError, Result};
use crate::predicates::Predicate;

/// Wraps a `(&str) -> bool` check; `true` means "violates"
pub struct CustomPredicate {
    name: String,
    check: Box<dyn Fn(&str) -> bool + Send + Sync>,
}

impl CustomPredicate {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::named("custom", check)
    }

    pub fn named<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Box::new(check),
        }
    }

    /// Violates when any of the regex patterns matches
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let set = RegexSet::new(patterns.iter().map(|p| p.as_ref()))
            .map_err(|e| GuardError::config(format!("invalid deny pattern: {}", e)))?;
        Ok(Self::new(move |output| set.is_match(output)))
    }
}

impl std::fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomPredicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Predicate for CustomPredicate {
    fn name(&self) -> &str {
        &self.name
    }

    fn violates(&self, output: &str) -> Result<bool> {
        Ok((self.check)(output))
    }
}
