//! Verdicts and the JSON output printed by the CLI

use serde::Serialize;

/// Verdict from evaluating predicates against one output
#[derive(Debug, Clone)]
pub enum Verdict {
    /// No predicate triggered
    Pass { reason: String },

    /// A predicate reported a violation
    Violation { guard: String, reason: String },
}

impl Verdict {
    /// Create a pass verdict
    pub fn pass(reason: impl Into<String>) -> Self {
        Verdict::Pass {
            reason: reason.into(),
        }
    }

    /// Create a violation verdict
    pub fn violation(guard: impl Into<String>, reason: impl Into<String>) -> Self {
        Verdict::Violation {
            guard: guard.into(),
            reason: reason.into(),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass { .. })
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, Verdict::Violation { .. })
    }

    /// Get the guard name if applicable
    pub fn guard(&self) -> Option<&str> {
        match self {
            Verdict::Pass { .. } => None,
            Verdict::Violation { guard, .. } => Some(guard),
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Verdict::Pass { reason } => reason,
            Verdict::Violation { reason, .. } => reason,
        }
    }
}

/// JSON document written to stdout by `text-guards` check mode
#[derive(Debug, Serialize)]
pub struct CheckOutput {
    /// "pass" or "violation"
    pub verdict: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,

    pub reason: String,
}

/// JSON document written to stdout by `text-guards --exec`
#[derive(Debug, Serialize)]
pub struct RunOutput {
    /// "accepted", "exhausted" or "failed"
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckOutput {
    /// Create output from a Verdict
    pub fn from_verdict(verdict: &Verdict) -> Self {
        match verdict {
            Verdict::Pass { reason } => CheckOutput {
                verdict: "pass",
                guard: None,
                reason: reason.clone(),
            },
            Verdict::Violation { guard, reason } => CheckOutput {
                verdict: "violation",
                guard: Some(guard.clone()),
                reason: reason.clone(),
            },
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl RunOutput {
    pub fn failed(error: impl Into<String>) -> Self {
        RunOutput {
            status: "failed",
            output: None,
            attempts: None,
            error: Some(error.into()),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
