//! Restriction checks delegated to an external judge
//!
//! The judge (usually a language model) decides whether an output breaks
//! any of a list of natural-language restrictions. This module only
//! consumes its verdict; judge failures propagate as errors and are never
//! read as either "violates" or "complies".

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GuardError, Result};
use crate::predicates::Predicate;

/// Marker a judge appends when the output violates a restriction
pub const VIOLATION_MARKER: &str = "✅";

/// Marker a judge appends when the output complies
pub const COMPLIANCE_MARKER: &str = "❌";

static VERDICT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new("✅|❌").unwrap());

/// Answers "does this output violate these restrictions?"
pub trait Judge {
    fn judge(&self, output: &str, restrictions: &[String]) -> Result<bool>;
}

impl<F> Judge for F
where
    F: Fn(&str, &[String]) -> Result<bool>,
{
    fn judge(&self, output: &str, restrictions: &[String]) -> Result<bool> {
        self(output, restrictions)
    }
}

/// Predicate backed by a [`Judge`]
#[derive(Debug, Clone)]
pub struct RestrictionPredicate<J> {
    restrictions: Vec<String>,
    judge: J,
}

impl<J: Judge> RestrictionPredicate<J> {
    pub fn new<I, S>(restrictions: I, judge: J) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let restrictions: Vec<String> = restrictions.into_iter().map(Into::into).collect();
        if restrictions.iter().any(|r| r.trim().is_empty()) {
            return Err(GuardError::config("restrictions must not be blank"));
        }
        Ok(Self {
            restrictions,
            judge,
        })
    }

    pub fn restrictions(&self) -> &[String] {
        &self.restrictions
    }
}

impl<J: Judge> Predicate for RestrictionPredicate<J> {
    fn name(&self) -> &str {
        "restriction"
    }

    fn violates(&self, output: &str) -> Result<bool> {
        if self.restrictions.is_empty() {
            return Ok(false);
        }
        self.judge.judge(output, &self.restrictions)
    }
}

/// Build the prompt handed to a text-based judge
pub fn render_judgment_prompt(output: &str, restrictions: &[String]) -> String {
    let mut prompt = String::from(
        "Determine if the output of a function violates any restrictions. \
         If the output violates any of the restrictions, respond with your reason \
         followed by ✅. If the output does not violate any restrictions, respond \
         with your reason followed by ❌.\n\nRestrictions:\n",
    );
    for restriction in restrictions {
        prompt.push_str("- ");
        prompt.push_str(restriction.trim());
        prompt.push('\n');
    }
    prompt.push_str("\nOutput:\n");
    prompt.push_str(output);
    prompt.push('\n');
    prompt
}

/// Read the verdict from a judge reply; the last marker wins
pub fn parse_judgment(reply: &str) -> Result<bool> {
    match VERDICT_MARKER.find_iter(reply).last() {
        Some(m) => Ok(m.as_str() == VIOLATION_MARKER),
        None => Err(GuardError::Judgment(format!(
            "reply has no verdict marker: {}",
            reply.trim()
        ))),
    }
}

/// Judge that pipes the rendered prompt to a shell command
#[derive(Debug, Clone)]
pub struct CommandJudge {
    command: String,
}

impl CommandJudge {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Judge for CommandJudge {
    fn judge(&self, output: &str, restrictions: &[String]) -> Result<bool> {
        let prompt = render_judgment_prompt(output, restrictions);

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GuardError::Judgment(format!("failed to start judge: {}", e)))?;

        // Feed stdin on its own thread so a judge that echoes its input
        // cannot fill stdout while we are still writing.
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(prompt.as_bytes()),
            None => Ok(()),
        });

        let reply = child
            .wait_with_output()
            .map_err(|e| GuardError::Judgment(format!("judge did not finish: {}", e)))?;

        match writer.join() {
            Ok(Ok(())) => {}
            // The judge answered without reading the whole prompt
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!("judge closed stdin before reading the full prompt");
            }
            Ok(Err(e)) => {
                return Err(GuardError::Judgment(format!("failed to send prompt: {}", e)));
            }
            Err(_) => return Err(GuardError::Judgment("prompt writer panicked".to_string())),
        }

        if !reply.status.success() {
            return Err(GuardError::Judgment(format!(
                "judge exited with {}: {}",
                reply.status,
                String::from_utf8_lossy(&reply.stderr).trim()
            )));
        }

        parse_judgment(&String::from_utf8_lossy(&reply.stdout))
    }
}
