//! Error types for text-guards

/// Errors raised while building or running guards
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// Malformed guard configuration, reported at construction time
    #[error("invalid guard configuration: {0}")]
    Configuration(String),

    /// The wrapped operation failed; never retried
    #[error("operation failed: {0}")]
    Operation(Box<dyn std::error::Error + Send + Sync>),

    /// The judgment collaborator could not produce a verdict
    #[error("judgment failed: {0}")]
    Judgment(String),

    /// Every attempt violated the guard and the policy is `Fail`
    #[error("guard '{guard}' exhausted after {attempts} attempt(s)")]
    Exhausted {
        guard: String,
        attempts: u32,
        last_output: String,
    },
}

impl GuardError {
    /// Build a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        GuardError::Configuration(msg.into())
    }

    /// Wrap any error (or message) as an operation failure
    pub fn operation<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        GuardError::Operation(err.into())
    }

    /// Check if this is an exhaustion failure
    pub fn is_exhausted(&self) -> bool {
        matches!(self, GuardError::Exhausted { .. })
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;
