//! Common utilities for the guard engine
//!
//! Text summaries for logs, with protected strings masked out.

use once_cell::sync::Lazy;
use regex::Regex;

const SUMMARY_LIMIT: usize = 100;
const MASK: &str = "[REDACTED]";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Masks protected strings in text headed for the audit log
///
/// Any run of characters long enough to trip the string guard at this
/// leniency is masked, not only whole occurrences.
#[derive(Debug, Clone)]
pub struct Redactor {
    /// Lowercased protected strings, as chars
    protected: Vec<Vec<char>>,
    leniency: f64,
}

impl Default for Redactor {
    fn default() -> Self {
        Self {
            protected: Vec::new(),
            leniency: 1.0,
        }
    }
}

impl Redactor {
    pub fn new<I, S>(protected: I, leniency: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            protected: protected
                .into_iter()
                .map(|s| s.as_ref().chars().map(fold).collect::<Vec<_>>())
                .filter(|p| !p.is_empty())
                .collect(),
            leniency,
        }
    }

    /// Redact with more protected strings at the same leniency
    pub fn extended<I, S>(&self, more: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut redactor = self.clone();
        redactor
            .protected
            .extend(Self::new(more, self.leniency).protected);
        redactor
    }

    /// Replace each masked span with a single `[REDACTED]`
    pub fn redact(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let folded: Vec<char> = chars.iter().copied().map(fold).collect();
        let mut masked = vec![false; chars.len()];

        for p in &self.protected {
            let threshold = ((self.leniency * p.len() as f64).ceil() as usize).max(1);
            while let Some((end, len)) = longest_unmasked_run(&folded, &masked, p) {
                if len < threshold {
                    break;
                }
                masked[end + 1 - len..=end].iter_mut().for_each(|m| *m = true);
            }
        }

        let mut redacted = String::with_capacity(text.len());
        for (i, &c) in chars.iter().enumerate() {
            if !masked[i] {
                redacted.push(c);
            } else if i == 0 || !masked[i - 1] {
                redacted.push_str(MASK);
            }
        }
        redacted
    }

    /// One-line, truncated, redacted summary for audit entries
    pub fn summarize(&self, text: &str) -> String {
        let redacted = self.redact(text);
        let flat = WHITESPACE.replace_all(redacted.trim(), " ");

        if flat.chars().count() > SUMMARY_LIMIT {
            let truncated: String = flat.chars().take(SUMMARY_LIMIT).collect();
            format!("{}...", truncated)
        } else {
            flat.to_string()
        }
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// End index and length of the longest run of `text` shared with `protected`
/// that touches no masked character
fn longest_unmasked_run(text: &[char], masked: &[bool], protected: &[char]) -> Option<(usize, usize)> {
    let mut prev = vec![0usize; protected.len() + 1];
    let mut curr = vec![0usize; protected.len() + 1];
    let mut best: Option<(usize, usize)> = None;

    for (i, &c) in text.iter().enumerate() {
        for (j, &p) in protected.iter().enumerate() {
            curr[j + 1] = if !masked[i] && c == p { prev[j] + 1 } else { 0 };
            if curr[j + 1] > best.map_or(0, |(_, len)| len) {
                best = Some((i, curr[j + 1]));
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
