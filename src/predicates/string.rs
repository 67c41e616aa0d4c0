//! Protected-string leak detection
//!
//! Flags outputs that reproduce too much of a protected string. The overlap
//! is the longest contiguous run of characters shared by the (lowercased)
//! output and protected string; the predicate triggers once that run
//! reaches `leniency * len(protected)`.

use crate::error::{GuardError, Result};
use crate::predicates::Predicate;

/// Case-insensitive protected-string predicate
#[derive(Debug, Clone)]
pub struct StringPredicate {
    /// Lowercased protected strings, as chars
    protected: Vec<Vec<char>>,
    leniency: f64,
}

impl StringPredicate {
    /// Create a predicate; `leniency` must lie in (0, 1]
    pub fn new<I, S>(protected: I, leniency: f64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !(leniency > 0.0 && leniency <= 1.0) {
            return Err(GuardError::config(format!(
                "leniency must be in (0, 1], got {}",
                leniency
            )));
        }

        let mut compiled = Vec::new();
        for s in protected {
            let s = s.as_ref();
            if s.is_empty() {
                return Err(GuardError::config("protected strings must not be empty"));
            }
            compiled.push(s.to_lowercase().chars().collect());
        }

        Ok(Self {
            protected: compiled,
            leniency,
        })
    }

    /// Exact-match predicate (leniency 1)
    pub fn exact<I, S>(protected: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(protected, 1.0)
    }

    pub fn leniency(&self) -> f64 {
        self.leniency
    }

    pub fn protected_count(&self) -> usize {
        self.protected.len()
    }

    /// Add more protected strings, keeping the leniency
    pub fn extended<I, S>(&self, more: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let added = Self::new(more, self.leniency)?;
        let mut protected = self.protected.clone();
        protected.extend(added.protected);
        Ok(Self {
            protected,
            leniency: self.leniency,
        })
    }

    fn triggers(&self, candidate: &[char], protected: &[char]) -> bool {
        let overlap = longest_common_run(candidate, protected);
        overlap as f64 >= self.leniency * protected.len() as f64
    }
}

impl Predicate for StringPredicate {
    fn name(&self) -> &str {
        "string"
    }

    fn violates(&self, output: &str) -> Result<bool> {
        let candidate: Vec<char> = output.to_lowercase().chars().collect();
        Ok(self
            .protected
            .iter()
            .any(|protected| self.triggers(&candidate, protected)))
    }
}

/// Length of the longest contiguous run shared by `a` and `b`
pub fn longest_common_run(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Rolling row of the classic suffix-length table
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    let mut best = 0;

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            best = best.max(curr[j + 1]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
