//! Guarded retry wrapper
//!
//! A [`Guard`] owns an operation and a predicate. Each call invokes the
//! operation, checks the output, and re-invokes the operation from scratch
//! while the output violates the predicate and retries remain:
//!
//! ```text
//! READY -> INVOKING -> EVALUATING -> ACCEPTED
//!              ^            |
//!              +- RETRYING -+-> EXHAUSTED
//! ```
//!
//! Operation and predicate errors are surfaced immediately, never retried.
//! A guard is itself an [`Operation`], so guards stack: the outer guard
//! evaluates whatever the inner guard returns.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{GuardError, Result};
use crate::operation::Operation;
use crate::predicates::Predicate;

/// What to do when every attempt violated the predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Return the last output anyway
    #[default]
    ReturnLast,

    /// Fail with [`GuardError::Exhausted`]
    Fail,
}

impl ExhaustionPolicy {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "return_last" => Some(ExhaustionPolicy::ReturnLast),
            "fail" => Some(ExhaustionPolicy::Fail),
            _ => None,
        }
    }
}

/// Retry budget and exhaustion behavior for one guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuardConfig {
    /// Extra attempts after the first one
    pub retries: u32,
    pub on_exhaustion: ExhaustionPolicy,
}

impl GuardConfig {
    pub fn new(retries: u32) -> Self {
        Self {
            retries,
            on_exhaustion: ExhaustionPolicy::ReturnLast,
        }
    }

    /// Build from an untrusted retry count, rejecting negatives
    pub fn from_signed(retries: i64, on_exhaustion: ExhaustionPolicy) -> Result<Self> {
        let retries = u32::try_from(retries).map_err(|_| {
            GuardError::config(format!("retries must be a non-negative integer, got {}", retries))
        })?;
        Ok(Self {
            retries,
            on_exhaustion,
        })
    }

    pub fn failing(mut self) -> Self {
        self.on_exhaustion = ExhaustionPolicy::Fail;
        self
    }
}

/// How a guarded call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardStatus {
    /// An attempt passed the predicate
    Accepted,

    /// Every attempt violated; the last output was kept
    Exhausted,
}

/// Result of one guarded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub output: String,

    /// Number of times the operation was invoked
    pub attempts: u32,

    pub status: GuardStatus,
}

impl GuardOutcome {
    pub fn is_accepted(&self) -> bool {
        self.status == GuardStatus::Accepted
    }
}

/// An operation wrapped with a predicate and a retry budget
#[derive(Debug, Clone)]
pub struct Guard<O, P> {
    operation: O,
    predicate: P,
    config: GuardConfig,
}

impl<O: Operation, P: Predicate> Guard<O, P> {
    pub fn new(operation: O, predicate: P, config: GuardConfig) -> Self {
        Self {
            operation,
            predicate,
            config,
        }
    }

    pub fn config(&self) -> GuardConfig {
        self.config
    }

    pub fn predicate(&self) -> &P {
        &self.predicate
    }

    /// Run the retry loop once, reporting how it ended
    pub fn run(&self) -> Result<GuardOutcome> {
        let guard = self.predicate.name();
        let max_attempts = self.config.retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(guard, attempt, max_attempts, "invoking guarded operation");

            let output = self.operation.invoke()?;

            if !self.predicate.violates(&output)? {
                debug!(guard, attempt, "output accepted");
                return Ok(GuardOutcome {
                    output,
                    attempts: attempt,
                    status: GuardStatus::Accepted,
                });
            }

            if attempt < max_attempts {
                debug!(guard, attempt, "output violates guard, retrying");
                continue;
            }

            warn!(guard, attempts = attempt, "guard exhausted");
            return match self.config.on_exhaustion {
                ExhaustionPolicy::ReturnLast => Ok(GuardOutcome {
                    output,
                    attempts: attempt,
                    status: GuardStatus::Exhausted,
                }),
                ExhaustionPolicy::Fail => Err(GuardError::Exhausted {
                    guard: guard.to_string(),
                    attempts: attempt,
                    last_output: output,
                }),
            };
        }
    }
}

impl<O: Operation, P: Predicate> Operation for Guard<O, P> {
    fn invoke(&self) -> Result<String> {
        self.run().map(|outcome| outcome.output)
    }
}

/// Decorator-style stacking for any operation
pub trait GuardExt: Operation + Sized {
    /// Wrap `self` with a guard
    fn guard<P: Predicate>(self, predicate: P, config: GuardConfig) -> Guard<Self, P> {
        Guard::new(self, predicate, config)
    }
}

impl<O: Operation> GuardExt for O {}
