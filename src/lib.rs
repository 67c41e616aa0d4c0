//! text-guards - Retrying output guards for text-producing operations
//!
//! A guard wraps an operation that produces a string, checks each output
//! against a predicate, and re-invokes the operation when the output
//! violates it, up to a retry budget.
//!
//! # Features
//!
//! - **String guard**: blocks outputs that reproduce protected strings, with leniency
//! - **Restriction guard**: asks an external judge whether restrictions were broken
//! - **Custom guard**: any `(&str) -> bool` check, or a set of deny regexes
//! - **Chaining**: guards are operations, so they stack
//! - **CSV loading**: rows into text-plus-metadata documents
//! - **Audit logging**: JSONL log of checks and guarded runs
//!
//! # Example
//!
//! ```
//! use text_guards::{from_fn, GuardConfig, GuardExt, StringPredicate};
//!
//! let guarded = from_fn(|| Ok("I love my sock".to_string()))
//!     .guard(StringPredicate::exact(["sock"]).unwrap(), GuardConfig::new(2));
//!
//! let outcome = guarded.run().unwrap();
//! assert_eq!(outcome.attempts, 3);
//! assert!(!outcome.is_accepted());
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod input;
pub mod loader;
pub mod operation;
pub mod output;
pub mod predicates;

// Re-exports for convenience
pub use config::Config;
pub use engine::GuardEngine;
pub use error::GuardError;
pub use guard::{ExhaustionPolicy, Guard, GuardConfig, GuardExt, GuardOutcome, GuardStatus};
pub use input::CheckInput;
pub use loader::{CsvLoader, Document};
pub use operation::{from_fn, CommandOperation, Operation};
pub use output::{CheckOutput, RunOutput, Verdict};
pub use predicates::{CommandJudge, CustomPredicate, Judge, Predicate, RestrictionPredicate, StringPredicate};
