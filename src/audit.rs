//! JSONL audit logging for text-guards
//!
//! Records every check and guarded run to a JSONL file for later analysis.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::engine::common::Redactor;
use crate::error::GuardError;
use crate::guard::{GuardOutcome, GuardStatus};
use crate::output::Verdict;

/// Log level for audit entries
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Accepted,
    Violation,
    Exhausted,
    Failed,
    Disabled,
}

/// An audit log entry
#[derive(Debug, Serialize)]
pub struct AuditEntry {
    /// Timestamp of the decision
    pub timestamp: DateTime<Utc>,

    pub level: LogLevel,

    /// "check" or "run"
    pub mode: &'static str,

    /// Guard that decided (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<String>,

    /// Operation invocations (runs only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,

    /// Redacted summary of the output
    pub output_summary: String,

    pub reason: String,

    /// Session ID (if provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AuditEntry {
    /// Entry for a one-shot check
    pub fn for_check(
        output: &str,
        verdict: &Verdict,
        redactor: &Redactor,
        session_id: Option<&str>,
        disabled: bool,
    ) -> Self {
        let (level, guard) = if disabled {
            (LogLevel::Disabled, None)
        } else {
            match verdict {
                Verdict::Pass { .. } => (LogLevel::Accepted, None),
                Verdict::Violation { guard, .. } => (LogLevel::Violation, Some(guard.clone())),
            }
        };

        Self {
            timestamp: Utc::now(),
            level,
            mode: "check",
            guard,
            attempts: None,
            output_summary: redactor.summarize(output),
            reason: verdict.reason().to_string(),
            session_id: session_id.map(String::from),
        }
    }

    /// Entry for a guarded run, successful or not
    pub fn for_run(
        result: &Result<GuardOutcome, GuardError>,
        outer_guard: Option<&str>,
        redactor: &Redactor,
        disabled: bool,
    ) -> Self {
        let (level, attempts, summary, reason) = match result {
            Ok(outcome) => {
                let level = match (disabled, outcome.status) {
                    (true, _) => LogLevel::Disabled,
                    (false, GuardStatus::Accepted) => LogLevel::Accepted,
                    (false, GuardStatus::Exhausted) => LogLevel::Exhausted,
                };
                let reason = match outcome.status {
                    GuardStatus::Accepted => "output accepted".to_string(),
                    GuardStatus::Exhausted => "retries exhausted, returned last output".to_string(),
                };
                (
                    level,
                    Some(outcome.attempts),
                    redactor.summarize(&outcome.output),
                    reason,
                )
            }
            Err(GuardError::Exhausted {
                attempts,
                last_output,
                ..
            }) => (
                LogLevel::Exhausted,
                Some(*attempts),
                redactor.summarize(last_output),
                "retries exhausted".to_string(),
            ),
            Err(e) => (LogLevel::Failed, None, String::new(), e.to_string()),
        };

        Self {
            timestamp: Utc::now(),
            level,
            mode: "run",
            guard: outer_guard.map(String::from),
            attempts,
            output_summary: summary,
            reason,
            session_id: None,
        }
    }
}

/// Audit logger
#[derive(Default)]
pub struct AuditLogger {
    writer: Option<BufWriter<File>>,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(path: Option<&Path>) -> Self {
        let writer = path.and_then(|p| {
            // Ensure parent directory exists
            if let Some(parent) = p.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            OpenOptions::new()
                .create(true)
                .append(true)
                .open(p)
                .ok()
                .map(BufWriter::new)
        });

        Self { writer }
    }

    /// Log an audit entry
    pub fn log(&mut self, entry: &AuditEntry) -> Result<(), std::io::Error> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }
}
