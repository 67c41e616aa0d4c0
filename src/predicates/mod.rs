//! Violation predicates for guards
//!
//! A predicate maps a candidate output to a "violates" signal. Guards treat
//! every variant the same way.

pub mod custom;
pub mod restriction;
pub mod string;

use crate::error::Result;

pub use custom::CustomPredicate;
pub use restriction::{CommandJudge, Judge, RestrictionPredicate};
pub use string::StringPredicate;

/// A check applied to an operation's output
pub trait Predicate {
    /// Short identifier used in logs and verdicts
    fn name(&self) -> &str;

    /// Returns `true` when `output` violates this predicate
    fn violates(&self, output: &str) -> Result<bool>;
}

impl<P: Predicate + ?Sized> Predicate for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn violates(&self, output: &str) -> Result<bool> {
        (**self).violates(output)
    }
}

impl<P: Predicate + ?Sized> Predicate for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn violates(&self, output: &str) -> Result<bool> {
        (**self).violates(output)
    }
}
