//! Guard engine for text-guards
//!
//! Builds the configured guard chain and applies it, either as a one-shot
//! check of an existing output or as a guarded run of an operation.

pub mod common;

use self::common::Redactor;
use crate::config::Config;
use crate::error::Result;
use crate::guard::{Guard, GuardConfig, GuardOutcome, GuardStatus};
use crate::operation::Operation;
use crate::output::Verdict;
use crate::predicates::{CommandJudge, CustomPredicate, Predicate, RestrictionPredicate, StringPredicate};

use std::env;

/// One guard in the chain
struct Layer {
    predicate: Box<dyn Predicate + Send + Sync>,
    config: GuardConfig,
}

/// The main guard engine
pub struct GuardEngine {
    /// Innermost first
    layers: Vec<Layer>,
    protected: Vec<String>,
    leniency: f64,
}

impl GuardEngine {
    /// An engine with no guards
    pub fn empty() -> Self {
        Self {
            layers: Vec::new(),
            protected: Vec::new(),
            leniency: 1.0,
        }
    }

    /// Build the chain string -> custom -> restriction from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let mut engine = Self::empty();
        engine.leniency = config.string.leniency;

        if !config.string.protected.is_empty() {
            let predicate = StringPredicate::new(&config.string.protected, config.string.leniency)?;
            engine.protected = config.string.protected.clone();
            engine = engine.with_guard(predicate, config.guard_config(config.string.retries)?);
        }

        if !config.custom.deny_patterns.is_empty() {
            let predicate = CustomPredicate::from_patterns(&config.custom.deny_patterns)?;
            engine = engine.with_guard(predicate, config.guard_config(config.custom.retries)?);
        }

        if let Some(command) = &config.restriction.judge_command {
            if !config.restriction.restrictions.is_empty() {
                let predicate = RestrictionPredicate::new(
                    config.restriction.restrictions.iter().cloned(),
                    CommandJudge::new(command.clone()),
                )?;
                engine =
                    engine.with_guard(predicate, config.guard_config(config.restriction.retries)?);
            }
        }

        Ok(engine)
    }

    /// Add a guard outside all existing ones
    pub fn with_guard<P>(mut self, predicate: P, config: GuardConfig) -> Self
    where
        P: Predicate + Send + Sync + 'static,
    {
        self.layers.push(Layer {
            predicate: Box::new(predicate),
            config,
        });
        self
    }

    /// Check if guards are disabled via environment
    pub fn is_disabled(&self) -> bool {
        env::var("TEXT_GUARDS_DISABLED").is_ok()
    }

    /// Names of the guards, innermost first
    pub fn guard_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.predicate.name()).collect()
    }

    /// Protected strings from configuration
    pub fn protected(&self) -> &[String] {
        &self.protected
    }

    /// Masks what the string guard would flag, for audit summaries
    pub fn redactor(&self) -> Redactor {
        Redactor::new(&self.protected, self.leniency)
    }

    /// Evaluate every guard once against an existing output
    ///
    /// `extra_protected` adds protected strings for this check only, at the
    /// configured leniency; empty entries are ignored. Judge failures are
    /// returned as errors.
    pub fn check(&self, output: &str, extra_protected: &[String]) -> Result<Verdict> {
        if self.is_disabled() {
            return Ok(Verdict::pass("disabled via TEXT_GUARDS_DISABLED"));
        }

        let extra_protected: Vec<&String> =
            extra_protected.iter().filter(|p| !p.is_empty()).collect();
        if !extra_protected.is_empty() {
            let predicate = StringPredicate::new(extra_protected, self.leniency)?;
            if predicate.violates(output)? {
                return Ok(Verdict::violation(
                    predicate.name(),
                    "output reproduces a protected string from the request",
                ));
            }
        }

        for layer in &self.layers {
            let name = layer.predicate.name();
            if layer.predicate.violates(output)? {
                return Ok(Verdict::violation(
                    name,
                    format!("output violates the '{}' guard", name),
                ));
            }
        }

        Ok(Verdict::pass("output passed all guards"))
    }

    /// Invoke `operation` through the whole guard chain
    ///
    /// The returned outcome is the outermost guard's; inner guards that
    /// exhaust hand their last output outward.
    pub fn run<'a, O>(&'a self, operation: O) -> Result<GuardOutcome>
    where
        O: Operation + 'a,
    {
        let Some((outer, inner)) = self.layers.split_last().filter(|_| !self.is_disabled()) else {
            let output = operation.invoke()?;
            return Ok(GuardOutcome {
                output,
                attempts: 1,
                status: GuardStatus::Accepted,
            });
        };

        let mut chained: Box<dyn Operation + 'a> = Box::new(operation);
        for layer in inner {
            chained = Box::new(Guard::new(chained, layer.predicate.as_ref(), layer.config));
        }

        Guard::new(chained, outer.predicate.as_ref(), outer.config).run()
    }
}
